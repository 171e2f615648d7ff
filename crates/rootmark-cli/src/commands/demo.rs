//! Demo command - allocate two records, drop a root, collect.

use anyhow::{Context, Result};
use clap::Args;
use rootmark_gc::{Collector, GcConfig, Handle};
use serde::Serialize;

use super::StatsReport;

/// Size of one demo record
const RECORD_SIZE: usize = 64;

/// Width of the little-endian id at the start of a record
const ID_SIZE: usize = 4;

#[derive(Args)]
pub struct DemoCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// A record allocation and the duplicated name string it owns
#[derive(Debug, Clone, Copy)]
struct Record {
    record: Handle,
    name: Handle,
}

#[derive(Serialize)]
struct DemoReport {
    before: StatsReport,
    bytes_reclaimed: usize,
    after: StatsReport,
    survivor: String,
}

impl DemoCommand {
    pub fn run(&self, config: GcConfig) -> Result<()> {
        let mut gc = Collector::with_config(config).context("Invalid collector config")?;

        let p1 = new_record(&mut gc, 1, "Zacarias")?;
        let p2 = new_record(&mut gc, 2, "Lagostim")?;

        gc.register_root(p1.record)?;
        gc.register_root(p2.record)?;
        gc.register_edge(p1.record, p1.record)?;

        if !self.json {
            println!("Simple collector example");
            println!("Record 1: {}", describe(&gc, p1)?);
            println!("Record 2: {}", describe(&gc, p2)?);
        }
        let before = StatsReport::from(gc.stats());

        // Dropping the root makes record 2 and its name unreachable
        gc.remove_root(p2.record)?;
        let bytes_reclaimed = gc.collect();

        let after = StatsReport::from(gc.stats());
        let survivor = describe(&gc, p1)?;

        if self.json {
            let report = DemoReport {
                before,
                bytes_reclaimed,
                after,
                survivor,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            before.print_human_readable("Statistics before collection");
            println!("Collection done. Bytes reclaimed: {bytes_reclaimed}");
            after.print_human_readable("Statistics after collection");
            println!("Record 1 (still valid): {survivor}");
            println!(
                "Record 2 is {}",
                if gc.contains(p2.record) { "alive" } else { "collected" }
            );
        }

        gc.finalize();
        Ok(())
    }
}

/// Allocate a record holding a little-endian id, plus its name as a
/// separate NUL-terminated string reachable only through the record
fn new_record(gc: &mut Collector, id: u32, name: &str) -> Result<Record> {
    let record = gc.allocate(RECORD_SIZE)?;
    gc.payload_mut(record)?[..ID_SIZE].copy_from_slice(&id.to_le_bytes());
    let name = gc.duplicate_string(name)?;
    gc.register_edge(record, name)?;
    Ok(Record { record, name })
}

fn describe(gc: &Collector, record: Record) -> Result<String> {
    let payload = gc.payload(record.record)?;
    let id = u32::from_le_bytes(payload[..ID_SIZE].try_into()?);
    let name = gc.c_str(record.name)?;
    Ok(format!("ID={id}, Name={}", name.to_string_lossy()))
}
