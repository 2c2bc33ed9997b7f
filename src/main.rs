use std::sync::Arc;
use std::thread;
use std::time::Duration;

use statusblock::{load_config, DeviceError, DeviceRegistry, StatusDevice};

fn main() {
    println!("===========================================");
    println!("statusblock - periodic status device demo");
    println!("===========================================\n");

    let cfg = load_config("config/statusblock.toml");
    println!(
        "device {}: reporting every {}s\n",
        cfg.device_id(),
        cfg.delay_secs
    );

    let device = Arc::new(StatusDevice::from_config(&cfg));
    let registry = DeviceRegistry::new();
    if let Err(e) = registry.register(cfg.device_id(), device.clone()) {
        eprintln!("registration failed: {}", e);
        return;
    }

    if let Err(e) = device.on_open() {
        eprintln!("open failed: {}", e);
        return;
    }

    let token = device.cancel_token();
    let reader = {
        let device = device.clone();
        let token = token.clone();
        thread::spawn(move || loop {
            match device.read(2048, &token) {
                Ok(bytes) if bytes.is_empty() => continue,
                Ok(bytes) => {
                    println!("[reader] {}", String::from_utf8_lossy(&bytes).trim_end());
                }
                Err(DeviceError::Interrupted) => {
                    println!("[reader] interrupted, exiting");
                    break;
                }
                Err(e) => {
                    eprintln!("[reader] read failed: {}", e);
                    break;
                }
            }
        })
    };

    let runtime = Duration::from_secs(cfg.delay_secs.saturating_mul(3).max(3));
    thread::sleep(runtime);

    println!("\n===========================================");
    println!("shutting down");
    device.on_release();
    token.cancel();
    let _ = reader.join();
    registry.unregister(cfg.device_id());

    let report = device.metrics().report();
    println!("\nfirings:          {}", report.firings);
    println!("drains:           {}", report.drains);
    println!("raced reads:      {}", report.raced_reads);
    println!("interruptions:    {}", report.interruptions);
    println!(
        "firing interval:  p50 {:?} / p99 {:?}",
        report.firing_interval_p50, report.firing_interval_p99
    );
    println!(
        "reader wait:      p50 {:?} / p99 {:?}",
        report.wait_p50, report.wait_p99
    );

    println!("\nlast trace entries:");
    for line in device.trace().tail(10) {
        println!("  {}", line);
    }
}
