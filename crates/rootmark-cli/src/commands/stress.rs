//! Stress command - build synthetic object graphs and collect them.

use anyhow::{Context, Result};
use clap::Args;
use rootmark_gc::{Collector, GcConfig, Handle};
use serde::Serialize;
use std::time::Instant;

use super::StatsReport;

#[derive(Args)]
pub struct StressCommand {
    /// Objects allocated per round
    #[arg(long, default_value_t = 10_000)]
    pub objects: usize,

    /// Payload size of each object in bytes
    #[arg(long, default_value_t = 32)]
    pub size: usize,

    /// Objects per chain
    #[arg(long, default_value_t = 50)]
    pub chain_len: usize,

    /// Extra forward edges per object
    #[arg(long, default_value_t = 1)]
    pub fanout: usize,

    /// Root one chain out of every N (0 roots nothing)
    #[arg(long, default_value_t = 4)]
    pub root_every: usize,

    /// Close every chain into a cycle
    #[arg(long)]
    pub cycles: bool,

    /// Number of rounds
    #[arg(long, default_value_t = 3)]
    pub rounds: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RoundReport {
    round: usize,
    allocated: usize,
    rooted_chains: usize,
    reclaimed: usize,
    live_objects: usize,
    elapsed_us: u64,
}

#[derive(Serialize)]
struct StressReport {
    rounds: Vec<RoundReport>,
    teardown_reclaimed: usize,
    stats: StatsReport,
}

impl StressCommand {
    pub fn run(&self, config: GcConfig) -> Result<()> {
        if self.chain_len == 0 {
            anyhow::bail!("--chain-len must be at least 1");
        }
        let mut gc = Collector::with_config(config).context("Invalid collector config")?;
        let mut roots: Vec<Handle> = Vec::new();
        let mut rounds = Vec::with_capacity(self.rounds);

        for round in 0..self.rounds {
            let start = Instant::now();
            let rooted_chains = self.build_round(&mut gc, &mut roots)?;
            let reclaimed = gc.collect();

            let report = RoundReport {
                round,
                allocated: self.objects,
                rooted_chains,
                reclaimed,
                live_objects: gc.object_count(),
                elapsed_us: start.elapsed().as_micros() as u64,
            };
            tracing::debug!(?report, "Stress round complete");
            if !self.json {
                println!(
                    "Round {}: allocated {}, rooted chains {}, reclaimed {} bytes, live {} ({} us)",
                    report.round,
                    report.allocated,
                    report.rooted_chains,
                    report.reclaimed,
                    report.live_objects,
                    report.elapsed_us
                );
            }
            rounds.push(report);
        }

        // Unroot everything; the whole heap must go
        for root in roots.drain(..) {
            gc.remove_root(root)?;
        }
        let teardown_reclaimed = gc.collect();
        if gc.object_count() != 0 {
            anyhow::bail!(
                "{} objects survived with no roots registered",
                gc.object_count()
            );
        }

        let stats = StatsReport::from(gc.stats());
        if self.json {
            let report = StressReport {
                rounds,
                teardown_reclaimed,
                stats,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("Teardown reclaimed {teardown_reclaimed} bytes");
            stats.print_human_readable("Final statistics");
        }
        Ok(())
    }

    /// Allocate one round of chains. Returns how many chains were rooted.
    ///
    /// Any allocation may trigger a collection, so a chain head is rooted
    /// and every new node is linked before the next allocation. Garbage
    /// chains can lose nodes mid-build; edges are only declared between
    /// nodes that are still live.
    fn build_round(&self, gc: &mut Collector, roots: &mut Vec<Handle>) -> Result<usize> {
        let mut rooted = 0;
        let mut remaining = self.objects;
        let mut chain_index = 0;

        while remaining > 0 {
            let len = remaining.min(self.chain_len);
            let mut chain: Vec<Handle> = Vec::with_capacity(len);

            for i in 0..len {
                let node = gc.allocate(self.size)?;
                if i == 0 && self.root_every > 0 && chain_index % self.root_every == 0 {
                    gc.register_root(node)?;
                    roots.push(node);
                    rooted += 1;
                }
                for step in 1..=self.fanout + 1 {
                    let Some(&from) = i.checked_sub(step).and_then(|j| chain.get(j)) else {
                        break;
                    };
                    if gc.contains(from) {
                        gc.register_edge(from, node)?;
                    }
                }
                chain.push(node);
            }

            if self.cycles && len > 1 && gc.contains(chain[0]) && gc.contains(chain[len - 1]) {
                gc.register_edge(chain[len - 1], chain[0])?;
            }

            remaining -= len;
            chain_index += 1;
        }
        Ok(rooted)
    }
}
