//! Edited-text parsing: block scanner and rule descriptors.

mod descriptor;
mod scanner;

pub use descriptor::{ParseOutcome, RuleDescriptor, parse_block, parse_css};
pub use scanner::{RawBlock, split_blocks};
