use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use tracing_subscriber::EnvFilter;
use xdp_acl::{
    Acl, AclConfig, AclDocument, MemoryStore, Padding, PortOrder, RuleBytes, RuleLayout,
    TableBytes, RULE_BUCKETS_NUM,
};

/// Compiles an ACL rules file into the records loaded in the XDP maps.
#[derive(Debug, Parser)]
pub struct Opt {
    /// JSON file with a top-level "rules" list.
    #[clap(short, long, default_value = "rules.json")]
    rule_file: PathBuf,
    /// Size of the rule bucket array, a power of two.
    #[clap(short, long, default_value_t = RULE_BUCKETS_NUM)]
    buckets: u32,
    #[clap(long, value_enum, default_value_t = Layout::Packed)]
    layout: Layout,
    #[clap(long, value_enum, default_value_t = Order::Network)]
    port_order: Order,
    /// Seed for table ids, random when absent.
    #[clap(long)]
    seed: Option<u64>,
    /// Print the encoded tables and buckets as hex.
    #[clap(long)]
    dump: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Layout {
    Packed,
    Aligned,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Order {
    Network,
    Native,
}

impl From<Layout> for Padding {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Packed => Padding::Packed,
            Layout::Aligned => Padding::Aligned,
        }
    }
}

impl From<Order> for PortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Network => PortOrder::Network,
            Order::Native => PortOrder::Native,
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    let opt = Opt::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AclConfig {
        bucket_count: opt.buckets,
        layout: RuleLayout::new(opt.layout.into(), opt.port_order.into()),
    };
    config.validate().context("invalid configuration")?;

    let file = File::open(&opt.rule_file)
        .with_context(|| format!("failed to open {}", opt.rule_file.display()))?;
    let doc = AclDocument::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to read rules from {}", opt.rule_file.display()))?;

    let rng: Box<dyn RngCore> = match opt.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rngs::OsRng),
    };
    let acl = Acl::new(&doc.rules, rng).context("failed to build acl")?;

    let mut tables = MemoryStore::<TableBytes>::default();
    let mut buckets = MemoryStore::<Vec<RuleBytes>>::default();
    acl.install(&config, &mut tables, &mut buckets)
        .context("failed to install acl")?;

    if opt.dump {
        for (index, record) in tables.iter() {
            println!("table {index}: {}", hex(record));
        }
        for (bucket, records) in buckets.iter() {
            for (slot, record) in records.iter().enumerate() {
                println!("bucket {bucket}[{slot}]: {}", hex(record));
            }
        }
    }
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
