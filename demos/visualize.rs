#[macro_use]
extern crate structopt;
extern crate ogst;

use ogst::SuffixTree;
use structopt::StructOpt;

#[derive(StructOpt)]
struct Options {
    #[structopt(name = "INPUT")]
    strings: Vec<String>,
}

fn main() {
    env_logger::init();
    let options = Options::from_args();

    let mut tree = SuffixTree::new();
    for (i, string) in options.strings.iter().enumerate() {
        tree.extend_all(&format!("s{}", i), string.bytes());
    }

    println!("{}", tree.pretty_print());
}
