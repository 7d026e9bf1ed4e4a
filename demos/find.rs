#[macro_use]
extern crate structopt;
extern crate ogst;

use ogst::SuffixTree;
use structopt::StructOpt;

#[derive(StructOpt)]
struct Options {
    #[structopt(name = "STRING")]
    string: String,
    #[structopt(name = "PATTERN")]
    pattern: String,
}

fn main() {
    env_logger::init();
    let options = Options::from_args();

    let mut tree = SuffixTree::new();
    tree.extend_all("s0", options.string.bytes());

    let occurrences = tree.contains(options.pattern.as_bytes());
    if !occurrences.present {
        return;
    }

    if let Some(positions) = occurrences.positions.get("s0") {
        for &start in positions {
            println!("{} {}", start, start + options.pattern.len());
        }
    }
}
