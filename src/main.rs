//! # pair-join CLI
//!
//! Command-line interface for the image pair joiner.
//!
//! ## Usage
//! ```bash
//! pair-join --input1 scans/in1 --input2 scans/in2 --join --join_similarity
//! ```

mod cli;

use image_pair_joiner::Result;

fn main() -> Result<()> {
    cli::run()
}
