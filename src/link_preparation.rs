use crate::{
    LinkBuilder,
    types::{Demand, DemandMatrix, Link, Result},
};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Prepare private links by handling operators, duplicating for bidirectionality, and adjusting bandwidth
pub fn prepare_private_links(links: &mut [Link]) -> Result<Vec<Link>> {
    // Fill missing secondary operators
    for link in links.iter_mut() {
        if link.operator2 == "0" || link.operator2.is_empty() {
            link.operator2 = link.operator1.clone();
        }
    }

    // Get max shared value before duplication
    let max_shared = links
        .iter()
        .filter_map(|l| match l.shared > 0 {
            false => None,
            true => Some(l.shared),
        })
        .max()
        .unwrap_or(0);

    // Create reverse links for bidirectionality
    let mut all_links = Vec::with_capacity(links.len() * 2);

    for link in links.iter() {
        // Original link
        let mut forward = link.clone();
        forward.bandwidth *= forward.uptime;
        forward.link_type = 0; // Available to all traffic types
        all_links.push(forward);

        // Reverse link
        let mut reverse = link.clone();
        std::mem::swap(&mut reverse.start, &mut reverse.end);
        reverse.bandwidth *= reverse.uptime;
        reverse.link_type = 0;

        // Adjust shared ID for reverse link
        if reverse.shared > 0 {
            reverse.shared += max_shared;
        }

        all_links.push(reverse);
    }

    // Compact shared IDs
    compact_shared_ids(&mut all_links);

    Ok(all_links)
}

/// Prepare public links by duplicating for bidirectionality
pub fn prepare_public_links(links: &[Link]) -> Result<Vec<Link>> {
    let mut all_links = Vec::with_capacity(links.len() * 2);

    for link in links {
        // Forward link
        let mut forward = link.clone();
        forward.link_type = 0; // Available to all traffic types
        all_links.push(forward);

        // Reverse link
        let mut reverse = link.clone();
        std::mem::swap(&mut reverse.start, &mut reverse.end);
        reverse.link_type = 0;
        all_links.push(reverse);
    }

    Ok(all_links)
}

/// Generate helper links and direct public paths per traffic type
pub fn generate_helper_links(public_links: &[Link], demand: &DemandMatrix) -> Result<Vec<Link>> {
    let traffic_types = demand.unique_types();

    // Process traffic types in parallel
    let helper_links: Vec<Vec<Link>> = traffic_types
        .par_iter()
        .filter_map(|&traffic_type| {
            // Get source city and destination cities for this traffic type
            let type_demands: Vec<&Demand> = demand
                .demands
                .iter()
                .filter(|d| d.demand_type == traffic_type)
                .collect();

            if type_demands.is_empty() {
                return None;
            }

            let src_city = &type_demands[0].start;
            let dst_cities: HashSet<&String> = type_demands.iter().map(|d| &d.end).collect();

            let mut type_helpers = Vec::new();

            // Find direct city-to-city public paths
            if let Ok(direct_paths) =
                find_direct_paths(public_links, src_city, &dst_cities, traffic_type)
            {
                type_helpers.extend(direct_paths);
            }

            // Create zero-cost helper links to/from switches
            if let Ok(src_helpers) = create_source_helpers(public_links, src_city, traffic_type) {
                type_helpers.extend(src_helpers);
            }

            if let Ok(dst_helpers) =
                create_destination_helpers(public_links, &dst_cities, traffic_type)
            {
                type_helpers.extend(dst_helpers);
            }

            Some(type_helpers)
        })
        .collect();

    // Flatten the results
    Ok(helper_links.into_iter().flatten().collect())
}

/// Merge all link components into final consolidated map
pub fn merge_link_components(
    private_links: Vec<Link>,
    public_links: Vec<Link>,
    helper_links: Vec<Link>,
    hybrid_penalty: Decimal,
) -> Result<Vec<Link>> {
    let mut all_links = Vec::new();

    // Add private links first
    all_links.extend(private_links);

    // Add public links with hybrid penalty
    for mut link in public_links {
        link.cost += hybrid_penalty;
        link.bandwidth = Decimal::ZERO;
        link.operator1 = "0".to_string();
        link.operator2 = "0".to_string();
        link.uptime = Decimal::ONE;
        link.shared = 0;
        all_links.push(link);
    }

    // Add helper links
    for mut link in helper_links {
        // Don't apply hybrid penalty to helper links - Python doesn't do this
        link.bandwidth = Decimal::ZERO;
        link.operator1 = "0".to_string();
        link.operator2 = "0".to_string();
        link.uptime = Decimal::ONE;
        link.shared = 0;
        all_links.push(link);
    }

    Ok(all_links)
}

/// Compact shared IDs to remove gaps in the sequence
fn compact_shared_ids(links: &mut [Link]) {
    // Get max shared value
    let max_shared = links
        .iter()
        .filter_map(|l| match l.shared > 0 {
            false => None,
            true => Some(l.shared),
        })
        .max()
        .unwrap_or(0);

    // For private links (those with operators), assign new shared IDs to previously unassigned links
    // This ensures each private link has bandwidth constraints
    let mut next_id = max_shared + 1;
    for link in links.iter_mut() {
        if link.shared == 0 && link.operator1 != "0" {
            link.shared = next_id;
            next_id += 1;
        }
    }

    // Create mapping from old to new IDs
    let unique_shared: Vec<usize> = links
        .iter()
        .filter_map(|l| match l.shared > 0 {
            false => None,
            true => Some(l.shared),
        })
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    if unique_shared.is_empty() {
        return;
    }

    let mut sorted_shared = unique_shared;
    sorted_shared.sort();

    let mapping: HashMap<usize, usize> = sorted_shared
        .into_iter()
        .enumerate()
        .map(|(idx, old_id)| (old_id, idx + 1))
        .collect();

    // Apply mapping
    for link in links.iter_mut() {
        if link.shared > 0 {
            link.shared = mapping[&link.shared];
        }
    }
}

/// Find quickest direct public paths between cities
#[inline]
fn find_direct_paths(
    public_links: &[Link],
    src_city: &str,
    dst_cities: &HashSet<&String>,
    traffic_type: usize,
) -> Result<Vec<Link>> {
    let mut city_paths: HashMap<(String, String), Decimal> = HashMap::new();

    // Find all paths from source city to destination cities
    for link in public_links {
        if link.start.len() >= 3 && link.end.len() >= 3 {
            let start_city = &link.start[..3];
            let end_city = &link.end[..3];

            if start_city == src_city && dst_cities.contains(&end_city.to_string()) {
                let key = (start_city.to_string(), end_city.to_string());
                city_paths
                    .entry(key)
                    .and_modify(|e| *e = (*e).min(link.cost))
                    .or_insert(link.cost);
            }
        }
    }

    // Create direct path links
    let mut direct_links = Vec::new();
    for ((start, end), cost) in city_paths {
        let link = LinkBuilder::default()
            .start(start)
            .end(end)
            .cost(cost)
            .link_type(traffic_type)
            .build()
            .unwrap();
        direct_links.push(link);
    }

    Ok(direct_links)
}

/// Create zero-cost helper links from source city to its switches
#[inline]
fn create_source_helpers(
    public_links: &[Link],
    src_city: &str,
    traffic_type: usize,
) -> Result<Vec<Link>> {
    let mut src_switches = HashSet::new();

    for link in public_links {
        if link.start.len() >= 3 && &link.start[..3] == src_city {
            src_switches.insert(link.start.clone());
        }
    }

    let mut helpers = Vec::new();
    for switch in src_switches {
        let link = LinkBuilder::default()
            .start(src_city.to_string())
            .end(switch)
            .cost(Decimal::ZERO)
            .link_type(traffic_type)
            .build()
            .unwrap();
        helpers.push(link);
    }

    Ok(helpers)
}

/// Create zero-cost helper links from switches to destination cities
#[inline]
fn create_destination_helpers(
    public_links: &[Link],
    dst_cities: &HashSet<&String>,
    traffic_type: usize,
) -> Result<Vec<Link>> {
    let mut dst_switches = HashSet::new();

    for link in public_links {
        if link.end.len() >= 3 {
            let city_code = &link.end[..3];
            if dst_cities.iter().any(|&city| city == city_code) {
                dst_switches.insert(link.end.clone());
            }
        }
    }

    let mut helpers = Vec::new();
    for switch in dst_switches.iter() {
        let city = &switch[..3];
        let link = LinkBuilder::default()
            .start(switch.to_string())
            .end(city.to_string())
            .cost(Decimal::ZERO)
            .link_type(traffic_type)
            .build()
            .unwrap();
        helpers.push(link);
    }

    Ok(helpers)
}
