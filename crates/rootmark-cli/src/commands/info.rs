//! Info command - show the effective collector configuration.

use anyhow::Result;
use clap::Args;
use rootmark_gc::GcConfig;
use serde::Serialize;

#[derive(Args)]
pub struct InfoCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ConfigInfo {
    version: &'static str,
    heap_budget: usize,
    trigger_ratio: f64,
    trigger_bytes: usize,
    max_roots: Option<usize>,
    max_edges: Option<usize>,
}

impl ConfigInfo {
    fn collect(config: &GcConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            heap_budget: config.heap_budget,
            trigger_ratio: config.trigger_ratio,
            trigger_bytes: (config.heap_budget as f64 * config.trigger_ratio) as usize,
            max_roots: config.max_roots,
            max_edges: config.max_edges,
        }
    }
}

impl InfoCommand {
    pub fn run(&self, config: &GcConfig) -> Result<()> {
        let info = ConfigInfo::collect(config);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            print_human_readable(&info);
        }

        Ok(())
    }
}

fn print_human_readable(info: &ConfigInfo) {
    fn limit(value: Option<usize>) -> String {
        value.map_or_else(|| "unbounded".to_string(), |n| n.to_string())
    }

    println!("Rootmark Collector");
    println!("==================");
    println!();
    println!("Version:        {}", info.version);
    println!("Heap budget:    {} bytes", info.heap_budget);
    println!(
        "Trigger:        {:.0}% ({} bytes)",
        info.trigger_ratio * 100.0,
        info.trigger_bytes
    );
    println!("Root limit:     {}", limit(info.max_roots));
    println!("Edge limit:     {}", limit(info.max_edges));
}
