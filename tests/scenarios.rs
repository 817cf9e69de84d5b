//! Golden scenarios and cross-cutting invariants for the Shapley pipeline.
//! Cities use 3-letter codes with a numeric switch suffix (e.g. "AAA1")
//! since the map consolidator derives a link's city from its first 3
//! characters when matching demand endpoints to switches.

use network_shapley::{
    Demand, DemandMatrix, LinkBuilder, NetworkShapleyBuilder, PrivateLinks, PublicLinks,
    ShapleyValue,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn link(start: &str, end: &str, cost: Decimal, operator1: &str) -> LinkBuilder {
    LinkBuilder::new(start.to_string(), end.to_string())
        .cost(cost)
        .operator1(operator1.to_string())
}

fn find<'a>(result: &'a [ShapleyValue], operator: &str) -> &'a ShapleyValue {
    result
        .iter()
        .find(|sv| sv.operator == operator)
        .unwrap_or_else(|| panic!("no Shapley value for operator {operator}"))
}

/// Scenario A: single direct private link shortcut.
#[test]
fn scenario_a_single_operator_shortcut() {
    let private_links = PrivateLinks::from_links(vec![
        link("AAA1", "BBB1", dec!(4), "X")
            .bandwidth(dec!(1000))
            .shared(1)
            .build()
            .unwrap(),
    ]);
    let public_links = PublicLinks::from_links(vec![
        LinkBuilder::new("AAA1".to_string(), "BBB1".to_string())
            .cost(dec!(10))
            .build()
            .unwrap(),
    ]);
    let demand = DemandMatrix::from_demands(vec![Demand::new(
        "AAA".to_string(),
        "BBB".to_string(),
        dec!(1),
        1,
    )]);

    let result = NetworkShapleyBuilder::new(private_links, public_links, demand)
        .operator_uptime(dec!(1))
        .hybrid_penalty(dec!(0))
        .build()
        .unwrap()
        .compute()
        .unwrap();

    assert_eq!(result.len(), 1);
    let x = find(&result, "X");
    assert_eq!(x.value, dec!(6));
    assert_eq!(x.percent, dec!(1));
}

/// Scenario B: two symmetric operators with disjoint links split value evenly.
#[test]
fn scenario_b_symmetric_operators_split_evenly() {
    let private_links = PrivateLinks::from_links(vec![
        link("AAA1", "BBB1", dec!(5), "X")
            .bandwidth(dec!(1000))
            .build()
            .unwrap(),
        link("BBB1", "CCC1", dec!(5), "Y")
            .bandwidth(dec!(1000))
            .build()
            .unwrap(),
    ]);
    let public_links = PublicLinks::from_links(vec![
        LinkBuilder::new("AAA1".to_string(), "BBB1".to_string())
            .cost(dec!(20))
            .build()
            .unwrap(),
        LinkBuilder::new("BBB1".to_string(), "CCC1".to_string())
            .cost(dec!(20))
            .build()
            .unwrap(),
        LinkBuilder::new("AAA1".to_string(), "CCC1".to_string())
            .cost(dec!(20))
            .build()
            .unwrap(),
    ]);
    let demand = DemandMatrix::from_demands(vec![Demand::new(
        "AAA".to_string(),
        "CCC".to_string(),
        dec!(1),
        1,
    )]);

    let result = NetworkShapleyBuilder::new(private_links, public_links, demand)
        .hybrid_penalty(dec!(0))
        .build()
        .unwrap()
        .compute()
        .unwrap();

    let x = find(&result, "X");
    let y = find(&result, "Y");
    assert_eq!(x.value, dec!(5));
    assert_eq!(y.value, dec!(5));
    assert_eq!(x.percent, dec!(0.5));
    assert_eq!(y.percent, dec!(0.5));
}

/// Scenario C: reduced uptime lowers the expected value of the shortcut.
#[test]
fn scenario_c_uptime_discounts_value() {
    let private_links = PrivateLinks::from_links(vec![
        link("AAA1", "BBB1", dec!(4), "X")
            .bandwidth(dec!(1000))
            .shared(1)
            .build()
            .unwrap(),
    ]);
    let public_links = PublicLinks::from_links(vec![
        LinkBuilder::new("AAA1".to_string(), "BBB1".to_string())
            .cost(dec!(10))
            .build()
            .unwrap(),
    ]);
    let demand = DemandMatrix::from_demands(vec![Demand::new(
        "AAA".to_string(),
        "BBB".to_string(),
        dec!(1),
        1,
    )]);

    let result = NetworkShapleyBuilder::new(private_links, public_links, demand)
        .operator_uptime(dec!(0.5))
        .hybrid_penalty(dec!(0))
        .build()
        .unwrap()
        .compute()
        .unwrap();

    let x = find(&result, "X");
    assert_eq!(x.value, dec!(3));
}

/// Scenario D: an operator whose private link is strictly worse than the
/// public alternative never gets used, so its attributed value is zero.
#[test]
fn scenario_d_dummy_operator_gets_nothing() {
    let private_links = PrivateLinks::from_links(vec![
        link("AAA1", "BBB1", dec!(4), "X")
            .bandwidth(dec!(1000))
            .build()
            .unwrap(),
        link("AAA1", "BBB1", dec!(20), "Y")
            .bandwidth(dec!(1000))
            .build()
            .unwrap(),
    ]);
    let public_links = PublicLinks::from_links(vec![
        LinkBuilder::new("AAA1".to_string(), "BBB1".to_string())
            .cost(dec!(10))
            .build()
            .unwrap(),
    ]);
    let demand = DemandMatrix::from_demands(vec![Demand::new(
        "AAA".to_string(),
        "BBB".to_string(),
        dec!(1),
        1,
    )]);

    let result = NetworkShapleyBuilder::new(private_links, public_links, demand)
        .hybrid_penalty(dec!(0))
        .build()
        .unwrap()
        .compute()
        .unwrap();

    let y = find(&result, "Y");
    assert_eq!(y.value, dec!(0));
    assert_eq!(y.percent, dec!(0));
}

/// Scenario E: the private link's shared-capacity cap binds, so one demand
/// unit routes over it and the rest spills onto the public path.
#[test]
fn scenario_e_shared_capacity_binds() {
    let private_links = PrivateLinks::from_links(vec![
        link("AAA1", "BBB1", dec!(1), "X")
            .bandwidth(dec!(1))
            .shared(1)
            .build()
            .unwrap(),
    ]);
    let public_links = PublicLinks::from_links(vec![
        LinkBuilder::new("AAA1".to_string(), "BBB1".to_string())
            .cost(dec!(10))
            .build()
            .unwrap(),
    ]);
    let demand = DemandMatrix::from_demands(vec![Demand::new(
        "AAA".to_string(),
        "BBB".to_string(),
        dec!(2),
        1,
    )]);

    let result = NetworkShapleyBuilder::new(private_links, public_links, demand)
        .hybrid_penalty(dec!(0))
        .build()
        .unwrap()
        .compute()
        .unwrap();

    // v(empty) = -(2 units * public cost 10) = -20.
    // v({X}) = -(1 unit private @ cost 1, capped by bandwidth, + 1 unit
    // public @ cost 10) = -11.
    // phi_X = v({X}) - v(empty) = -11 - (-20) = 9.
    let x = find(&result, "X");
    assert_eq!(x.value, dec!(9));
}

/// Scenario F: the hybrid penalty on public edges is large enough to flip
/// the optimal route from a two-hop public path to a single private hop.
#[test]
fn scenario_f_hybrid_penalty_flips_optimal_route() {
    let build_inputs = |hybrid_penalty: Decimal| {
        let private_links = PrivateLinks::from_links(vec![
            link("AAA1", "BBB1", dec!(10), "X")
                .bandwidth(dec!(1000))
                .build()
                .unwrap(),
        ]);
        let public_links = PublicLinks::from_links(vec![
            LinkBuilder::new("AAA1".to_string(), "CCC1".to_string())
                .cost(dec!(3))
                .build()
                .unwrap(),
            LinkBuilder::new("CCC1".to_string(), "BBB1".to_string())
                .cost(dec!(3))
                .build()
                .unwrap(),
        ]);
        let demand = DemandMatrix::from_demands(vec![Demand::new(
            "AAA".to_string(),
            "BBB".to_string(),
            dec!(1),
            1,
        )]);
        NetworkShapleyBuilder::new(private_links, public_links, demand)
            .hybrid_penalty(hybrid_penalty)
            .build()
            .unwrap()
    };

    // Low penalty: the public detour through CCC1 (6 total) beats the
    // private hop (10), so X's shortcut never gets used.
    let low = build_inputs(dec!(0)).compute().unwrap();
    assert_eq!(find(&low, "X").value, dec!(0));

    // High penalty: each public edge now costs 3+5=8, so the public route
    // (16) is worse than the private hop (10), and X's value reflects it.
    let high = build_inputs(dec!(5)).compute().unwrap();
    assert_eq!(find(&high, "X").value, dec!(6));
}

/// With zero private links, per the spec's round-trip/boundary rules, the
/// result is a single synthetic "NONE" row rather than an empty vector.
#[test]
fn zero_operators_yields_none_row() {
    let private_links = PrivateLinks::from_links(vec![]);
    let public_links = PublicLinks::from_links(vec![
        LinkBuilder::new("AAA1".to_string(), "BBB1".to_string())
            .cost(dec!(10))
            .build()
            .unwrap(),
    ]);
    let demand = DemandMatrix::from_demands(vec![Demand::new(
        "AAA".to_string(),
        "BBB".to_string(),
        dec!(1),
        1,
    )]);

    let result = NetworkShapleyBuilder::new(private_links, public_links, demand)
        .build()
        .unwrap()
        .compute()
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].operator, "NONE");
    assert_eq!(result[0].value, dec!(0));
    assert_eq!(result[0].percent, dec!(0));
}

/// Shapley efficiency: contributions sum to the coalition's total surplus.
/// With no hybrid penalty and equally-priced disjoint links, every
/// operator's value and the coalition's value coincide (scenario B).
#[test]
fn shapley_efficiency_holds() {
    let private_links = PrivateLinks::from_links(vec![
        link("AAA1", "BBB1", dec!(5), "X")
            .bandwidth(dec!(1000))
            .build()
            .unwrap(),
        link("BBB1", "CCC1", dec!(5), "Y")
            .bandwidth(dec!(1000))
            .build()
            .unwrap(),
    ]);
    let public_links = PublicLinks::from_links(vec![
        LinkBuilder::new("AAA1".to_string(), "BBB1".to_string())
            .cost(dec!(20))
            .build()
            .unwrap(),
        LinkBuilder::new("BBB1".to_string(), "CCC1".to_string())
            .cost(dec!(20))
            .build()
            .unwrap(),
        LinkBuilder::new("AAA1".to_string(), "CCC1".to_string())
            .cost(dec!(20))
            .build()
            .unwrap(),
    ]);
    let demand = DemandMatrix::from_demands(vec![Demand::new(
        "AAA".to_string(),
        "CCC".to_string(),
        dec!(1),
        1,
    )]);

    let result = NetworkShapleyBuilder::new(private_links, public_links, demand)
        .hybrid_penalty(dec!(0))
        .build()
        .unwrap()
        .compute()
        .unwrap();

    // v(full) - v(empty) = -10 - (-20) = 10, split 5/5 between X and Y.
    let total: Decimal = result.iter().map(|sv| sv.value).sum();
    assert_eq!(total, dec!(10));
}

/// Percent column always sums to 1 (or 0 when nothing has positive value).
#[test]
fn percent_sums_to_one() {
    let private_links = PrivateLinks::from_links(vec![
        link("AAA1", "BBB1", dec!(4), "X")
            .bandwidth(dec!(1000))
            .shared(1)
            .build()
            .unwrap(),
        link("AAA1", "BBB1", dec!(20), "Y")
            .bandwidth(dec!(1000))
            .build()
            .unwrap(),
    ]);
    let public_links = PublicLinks::from_links(vec![
        LinkBuilder::new("AAA1".to_string(), "BBB1".to_string())
            .cost(dec!(10))
            .build()
            .unwrap(),
    ]);
    let demand = DemandMatrix::from_demands(vec![Demand::new(
        "AAA".to_string(),
        "BBB".to_string(),
        dec!(1),
        1,
    )]);

    let result = NetworkShapleyBuilder::new(private_links, public_links, demand)
        .hybrid_penalty(dec!(0))
        .build()
        .unwrap()
        .compute()
        .unwrap();

    let total: Decimal = result.iter().map(|sv| sv.percent).sum();
    assert_eq!(total, dec!(1));
}

/// demand_multiplier scales the LP objective linearly, so every operator's
/// Shapley value scales by the same factor.
#[test]
fn demand_multiplier_scales_values_linearly() {
    let build = |demand_multiplier: Decimal| {
        let private_links = PrivateLinks::from_links(vec![
            link("AAA1", "BBB1", dec!(4), "X")
                .bandwidth(dec!(1000))
                .shared(1)
                .build()
                .unwrap(),
        ]);
        let public_links = PublicLinks::from_links(vec![
            LinkBuilder::new("AAA1".to_string(), "BBB1".to_string())
                .cost(dec!(10))
                .build()
                .unwrap(),
        ]);
        let demand = DemandMatrix::from_demands(vec![Demand::new(
            "AAA".to_string(),
            "BBB".to_string(),
            dec!(1),
            1,
        )]);
        NetworkShapleyBuilder::new(private_links, public_links, demand)
            .hybrid_penalty(dec!(0))
            .demand_multiplier(demand_multiplier)
            .build()
            .unwrap()
            .compute()
            .unwrap()
    };

    let base = build(dec!(1));
    let scaled = build(dec!(3));

    assert_eq!(find(&base, "X").value * dec!(3), find(&scaled, "X").value);
}

/// Too many operators is rejected before any LP is ever solved.
#[test]
fn too_many_operators_is_rejected() {
    let mut links = Vec::new();
    for i in 0..21 {
        links.push(
            link("AAA1", "BBB1", dec!(1), &format!("Op{i}"))
                .bandwidth(dec!(1))
                .build()
                .unwrap(),
        );
    }
    let private_links = PrivateLinks::from_links(links);
    let public_links = PublicLinks::from_links(vec![
        LinkBuilder::new("AAA1".to_string(), "BBB1".to_string())
            .cost(dec!(10))
            .build()
            .unwrap(),
    ]);
    let demand = DemandMatrix::from_demands(vec![Demand::new(
        "AAA".to_string(),
        "BBB".to_string(),
        dec!(1),
        1,
    )]);

    let result = NetworkShapleyBuilder::new(private_links, public_links, demand)
        .build()
        .unwrap()
        .compute();

    assert!(result.is_err());
}
