use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use airdrop_merkle::{hex_encode, Claim, MerkleData, MerkleTree, OddNodePolicy, TreeOptions};

#[derive(Parser, Debug)]
#[command(about = "Build Merkle tree from airdrop claims", long_about = None)]
pub struct Cli {
    /// Claim as ADDRESS:AMOUNT (repeat once per claim, in claim order)
    #[arg(short, long = "claim", value_name = "ADDRESS:AMOUNT")]
    claims: Vec<Claim>,

    /// Output JSON file for root, addresses, amounts and proofs
    #[arg(short, long, default_value = "merkleData.json")]
    output: PathBuf,

    /// Output file for every tree level (level:index:hash per line)
    #[arg(short, long)]
    tree_output: Option<PathBuf>,

    /// Pair leaves in the order given instead of sorting them first
    #[arg(long)]
    no_sort_leaves: bool,

    /// How an unpaired node at the end of a level is handled
    #[arg(long, value_enum, default_value_t = OddNodePolicy::Promote)]
    odd_node: OddNodePolicy,
}

impl Cli {
    fn options(&self) -> TreeOptions {
        TreeOptions {
            sort_leaves: !self.no_sort_leaves,
            odd_node: self.odd_node,
        }
    }
}

fn write_levels(path: &Path, tree: &MerkleTree) -> Result<()> {
    let file = File::create(path).context("Failed to create tree file")?;
    let mut writer = BufWriter::new(file);
    for (level_num, level) in tree.levels().iter().enumerate() {
        for (i, hash) in level.iter().enumerate() {
            writeln!(writer, "{}:{}:{}", level_num, i, hex_encode(hash))
                .context("Failed to write tree")?;
        }
    }
    writer.flush().context("Failed to flush tree file")?;
    Ok(())
}

pub fn run(cli: Cli) -> Result<()> {
    let options = cli.options();

    eprintln!("Total claims: {}", cli.claims.len());
    eprintln!("Building Merkle tree...");
    let tree = MerkleTree::from_claims(&cli.claims, &options)
        .context("Failed to build Merkle tree")?;
    let data = MerkleData::from_tree(&cli.claims, &tree)?;
    data.check().context("Generated proofs failed self-check")?;

    println!("Merkle root: {}", data.root);

    data.write(&cli.output)
        .context("Failed to write merkle data")?;
    println!("Merkle data written to {:?}", cli.output);

    if let Some(tree_path) = &cli.tree_output {
        eprintln!("Writing Merkle tree to {:?}...", tree_path);
        write_levels(tree_path, &tree)?;
    }

    eprintln!("Done!");
    Ok(())
}
