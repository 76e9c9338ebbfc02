//! usb-probe
//!
//! Enumerates USB devices through usbwrap, opens the ones it may, and prints
//! what it finds. Optionally reads the GET_STATUS word, dumps configuration
//! descriptors and claims interfaces.

mod config;

use anyhow::{Context as _, Result};
use clap::Parser;
use common::{DeviceFilter, setup_logging};
use config::ProbeConfig;
use std::time::Duration;
use tracing::{debug, info, warn};
use usbwrap::{ConfigDescriptor, Context, Device, DeviceList};

#[derive(Parser, Debug)]
#[command(name = "usb-probe")]
#[command(author, version, about = "Enumerate and probe USB devices through libusb")]
#[command(long_about = "
Lists attached USB devices, opening each one that the current user may access.

EXAMPLES:
    # List devices
    usb-probe

    # Also read the device status word and dump configuration descriptors
    usb-probe --status --configs

    # Claim all interfaces of matching devices
    usb-probe --claim --config ~/probe.toml

CONFIGURATION:
    The tool looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/usb-probe/probe.toml
    3. /etc/usb-probe/probe.toml
    4. Built-in defaults
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Read the GET_STATUS word of each opened device
    #[arg(long)]
    status: bool,

    /// Print the configuration descriptor tree of each opened device
    #[arg(long)]
    configs: bool,

    /// Claim every interface of each opened device
    #[arg(long)]
    claim: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.save_config {
        let config = ProbeConfig::default();
        let path = ProbeConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let config = if let Some(ref path) = args.config {
        ProbeConfig::load(Some(config::expand_path(path)))
            .context("Failed to load configuration")?
    } else {
        ProbeConfig::load_or_default()
    };

    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.probe.log_level);

    setup_logging(log_level).context("Failed to setup logging")?;

    info!("usb-probe v{}", env!("CARGO_PKG_VERSION"));
    debug!("Log level: {}", log_level);

    let filter = config.device_filter().context("Invalid device filter")?;
    let context = Context::with_log_level(config.libusb_log_level())
        .context("Failed to initialise libusb")?;

    let mut devices = DeviceList::new();
    devices
        .find_devices(&context)
        .context("Failed to enumerate USB devices")?;

    println!("Found {} device(s)", devices.len());

    let options = ProbeOptions {
        status: args.status,
        configs: args.configs,
        claim: args.claim || config.usb.claim_interfaces,
        detach_kernel_driver: config.usb.detach_kernel_driver,
        timeout: config.timeout(),
    };

    for device in &devices {
        probe_device(device, &filter, &options);
    }

    Ok(())
}

struct ProbeOptions {
    status: bool,
    configs: bool,
    claim: bool,
    detach_kernel_driver: bool,
    timeout: Duration,
}

/// Print one device. Failures are reported and the device is skipped.
fn probe_device(mut device: Device, filter: &DeviceFilter, options: &ProbeOptions) {
    let descriptor = match device.descriptor() {
        Ok(d) => d,
        Err(e) => {
            warn!(
                "Cannot read descriptor of device {:03}/{:03}: {}",
                device.bus_number(),
                device.address(),
                e
            );
            return;
        }
    };

    let (vid, pid) = (descriptor.vendor_id(), descriptor.product_id());
    if !filter.allows(vid, pid) {
        debug!("Device {:04x}:{:04x} ignored by filter", vid, pid);
        return;
    }

    if let Err(e) = device.open() {
        println!(
            "  Bus {:03} Device {:03}: {:04x}:{:04x} (not opened: {})",
            device.bus_number(),
            device.address(),
            vid,
            pid,
            e
        );
        return;
    }

    let product = descriptor
        .product_string_index()
        .and_then(|idx| device.read_string_descriptor(idx).ok());

    println!(
        "  Bus {:03} Device {:03}: {:04x}:{:04x} {}",
        device.bus_number(),
        device.address(),
        vid,
        pid,
        product.as_deref().unwrap_or("")
    );
    debug!("Speed {:?}", device.speed());

    if options.status {
        match device.get_status_with_timeout(options.timeout) {
            Ok(status) => println!("      Status: {:#06x}", status),
            Err(e) => println!("      Status: unavailable ({})", e),
        }
    }

    if options.configs {
        match device.config_descriptors() {
            Ok(configs) => configs.iter().for_each(print_config),
            Err(e) => println!("      Configurations unavailable ({})", e),
        }
    }

    if options.claim {
        if options.detach_kernel_driver
            && let Err(e) = device.set_auto_detach_kernel_driver(true)
        {
            debug!("Auto-detach of kernel drivers not available: {}", e);
        }

        match device.claim_all_interfaces() {
            Ok(()) => println!("      Claimed all interfaces"),
            Err(e) => println!("      Claim failed: {}", e),
        }
    }
}

fn print_config(config: &ConfigDescriptor) {
    println!(
        "      Configuration {}: {} interface(s), {} mA{}{}",
        config.number(),
        config.interface_count(),
        config.max_power(),
        if config.self_powered() { ", self-powered" } else { "" },
        if config.remote_wakeup() { ", remote wakeup" } else { "" }
    );

    for interface in config.interfaces() {
        for alt in interface.descriptors() {
            println!(
                "        Interface {} alt {}: class {:#04x}, {} endpoint(s)",
                alt.interface_number(),
                alt.setting_number(),
                alt.class_code(),
                alt.num_endpoints()
            );

            for endpoint in alt.endpoint_descriptors() {
                println!(
                    "          Endpoint {:#04x}: {:?} {:?}, max packet {}",
                    endpoint.address(),
                    endpoint.direction(),
                    endpoint.transfer_type(),
                    endpoint.max_packet_size()
                );
            }
        }
    }
}
