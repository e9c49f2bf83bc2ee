use structopt::StructOpt;

use survey::hashing::sha256_hex;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "fingerprint",
    about = "Print the digests under which values appear in exported records"
)]
struct Opt {
    /// The emails or ages to digest
    values: Vec<String>,
}

fn main() {
    let opt = Opt::from_args();

    for value in &opt.values {
        println!("{}\t{}", sha256_hex(value), value);
    }
}
