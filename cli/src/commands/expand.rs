use colored::*;

use crate::terminal::{colors, print};
use sweepr_common::config::Config;
use sweepr_common::network::target::TargetSet;
use sweepr_common::success;

pub fn expand(targets: &TargetSet, cfg: &Config) {
    print::header("expanded targets", cfg.quiet);

    for addr in targets.iter() {
        match cfg.quiet {
            0 => print::print_status(addr.to_string().color(colors::IPV4_ADDR).to_string()),
            _ => print::print(&addr.to_string()),
        }
    }

    if cfg.quiet < 2 {
        let count = targets.len();
        let noun = if count == 1 { "address" } else { "addresses" };
        success!("{} {noun} from {}", count.to_string().bold().green(), targets);
    }
}
