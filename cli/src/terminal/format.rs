use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::terminal::colors;
use colored::*;
use sweepr_core::OpenPortEvent;

pub type Detail = (String, ColoredString);

/// Groups open ports by host, both in ascending order.
pub fn group_by_host(events: &[OpenPortEvent]) -> BTreeMap<Ipv4Addr, BTreeSet<u16>> {
    let mut hosts: BTreeMap<Ipv4Addr, BTreeSet<u16>> = BTreeMap::new();
    for event in events {
        hosts.entry(event.address).or_default().insert(event.port);
    }
    hosts
}

pub fn ports_to_detail(ports: &BTreeSet<u16>) -> Vec<Detail> {
    ports
        .iter()
        .map(|port| ("TCP".to_string(), port.to_string().color(colors::PORT)))
        .collect()
}

pub fn open_port_line(event: &OpenPortEvent) -> String {
    format!(
        "{}{}{} {}",
        event.address.to_string().color(colors::IPV4_ADDR),
        ":".color(colors::SEPARATOR),
        event.port.to_string().color(colors::PORT),
        "open".green()
    )
}

pub fn seconds(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

pub fn plural<'a>(count: u64, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_and_sorts_ports_per_host() {
        let a = Ipv4Addr::new(10, 0, 0, 2);
        let b = Ipv4Addr::new(10, 0, 0, 1);
        let events = vec![
            OpenPortEvent::new(a, 443),
            OpenPortEvent::new(b, 22),
            OpenPortEvent::new(a, 80),
        ];

        let hosts = group_by_host(&events);
        let keys: Vec<&Ipv4Addr> = hosts.keys().collect();
        assert_eq!(keys, vec![&b, &a]);
        assert_eq!(hosts[&a].iter().copied().collect::<Vec<u16>>(), vec![80, 443]);
    }

    #[test]
    fn formats_elapsed_and_plurals() {
        assert_eq!(seconds(Duration::from_millis(1234)), "1.23s");
        assert_eq!(plural(1, "port", "ports"), "port");
        assert_eq!(plural(3, "port", "ports"), "ports");
    }
}
