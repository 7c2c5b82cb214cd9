//! The hard-coded FastRecon workflow diagram. Everything here is literal
//! data; the only logic is fanning links out between adjacent stage
//! groups. Node indices are positional and the stage ranges below are
//! the single source of truth for them.

use std::ops::Range;

use crate::diagram::Diagram;

pub const TITLE: &str = "FastRecon Workflow";

pub const LABELS: [&str; 29] = [
    "Input Files",
    "Subdomain Enum",
    "External Src",
    "subfinder",
    "assetfinder",
    "amass",
    "bbot",
    "subdog",
    "sudomy",
    "dnscan",
    "subdominator",
    "webcopilot",
    "crt.sh",
    "GitHub",
    "Shrewdeye",
    "SecurityTrails",
    "ASN Enum",
    "CIDR WHOIS",
    "Reverse DNS",
    "Combine",
    "Deduplicate",
    "Unique List",
    "httpx",
    "nmap",
    "wfuzz",
    "dirb",
    "gobuster",
    "dirsearch",
    "Final Output",
];

/// Node fill palette, assigned positionally (`PALETTE[i % 9]`). The
/// original chart repeats these nine values verbatim across all 29
/// nodes, so the cycle reproduces its exact color-per-node mapping.
pub const PALETTE: [&str; 9] = [
    "#1FB8CD", "#DB4545", "#2E8B57", "#5D878F", "#D2BA4C", "#B4413C", "#964325", "#944454",
    "#13343B",
];

const INPUT: usize = 0;
const SUBDOMAIN_STAGE: usize = 1;
const EXTERNAL_STAGE: usize = 2;
const ENUM_TOOLS: Range<usize> = 3..12;
const EXTERNAL_SOURCES: Range<usize> = 12..16;
const ASN_DISCOVERY: Range<usize> = 16..19;
const PROCESSING: Range<usize> = 19..22;
const LIVE_HOSTS: Range<usize> = 22..24;
const ENDPOINTS: Range<usize> = 24..28;
const FINAL_OUTPUT: usize = 28;

/// Assembles the full diagram: 29 nodes, 81 links, fixed generation
/// order. Pure and deterministic.
pub fn build_diagram() -> Diagram {
    let mut diagram = Diagram::new(TITLE);

    for (idx, label) in LABELS.iter().enumerate() {
        diagram.add_node(*label, PALETTE[idx % PALETTE.len()]);
    }

    // Input splits into the two parallel stages.
    diagram.add_link(INPUT, SUBDOMAIN_STAGE, 5.0);
    diagram.add_link(INPUT, EXTERNAL_STAGE, 3.0);

    for tool in ENUM_TOOLS {
        diagram.add_link(SUBDOMAIN_STAGE, tool, 1.0);
    }
    for source in EXTERNAL_SOURCES {
        diagram.add_link(EXTERNAL_STAGE, source, 1.0);
    }

    // Every tool and external source feeds every ASN/CIDR component.
    for tool in ENUM_TOOLS.start..EXTERNAL_SOURCES.end {
        for asn in ASN_DISCOVERY {
            diagram.add_link(tool, asn, 1.0);
        }
    }

    for asn in ASN_DISCOVERY {
        for proc in PROCESSING {
            diagram.add_link(asn, proc, 1.0);
        }
    }
    for proc in PROCESSING {
        for live in LIVE_HOSTS {
            diagram.add_link(proc, live, 2.0);
        }
    }
    for live in LIVE_HOSTS {
        for endpoint in ENDPOINTS {
            diagram.add_link(live, endpoint, 1.0);
        }
    }
    for endpoint in ENDPOINTS {
        diagram.add_link(endpoint, FINAL_OUTPUT, 2.0);
    }

    diagram
}
