use network_shapley::{Demand, DemandMatrix, LinkBuilder, NetworkShapleyBuilder, PrivateLinks, PublicLinks};
use rust_decimal_macros::dec;

fn main() {
    // Private links
    let private_links = PrivateLinks::from_links(vec![
        LinkBuilder::new("FRA1".to_string(), "NYC1".to_string())
            .cost(dec!(40))
            .bandwidth(dec!(10))
            .operator1("Alpha".to_string())
            .build()
            .expect("start/end are set"),
        LinkBuilder::new("FRA1".to_string(), "SIN1".to_string())
            .cost(dec!(50))
            .bandwidth(dec!(10))
            .operator1("Beta".to_string())
            .build()
            .expect("start/end are set"),
        LinkBuilder::new("SIN1".to_string(), "NYC1".to_string())
            .cost(dec!(80))
            .bandwidth(dec!(10))
            .operator1("Gamma".to_string())
            .build()
            .expect("start/end are set"),
    ]);

    // Public links
    let public_links = PublicLinks::from_links(vec![
        LinkBuilder::new("FRA1".to_string(), "NYC1".to_string())
            .cost(dec!(70))
            .build()
            .expect("start/end are set"),
        LinkBuilder::new("FRA1".to_string(), "SIN1".to_string())
            .cost(dec!(80))
            .build()
            .expect("start/end are set"),
        LinkBuilder::new("SIN1".to_string(), "NYC1".to_string())
            .cost(dec!(120))
            .build()
            .expect("start/end are set"),
    ]);

    // Demand
    let demand = DemandMatrix::from_demands(vec![
        Demand::new("SIN".to_string(), "NYC".to_string(), dec!(5), 1),
        Demand::new("SIN".to_string(), "FRA".to_string(), dec!(5), 1),
    ]);

    // Compute shapley values
    let engine = NetworkShapleyBuilder::new(private_links, public_links, demand)
        .operator_uptime(dec!(0.98))
        .hybrid_penalty(dec!(5.0))
        .demand_multiplier(dec!(1.0))
        .build()
        .expect("all three tables were supplied above");

    match engine.compute() {
        Err(e) => {
            eprintln!("Error computing Shapley values: {}", e);
        }
        Ok(shapley_values) => {
            for sv in shapley_values {
                println!(
                    "Operator: {}, Shapley: {}, Percent: {}%",
                    sv.operator,
                    sv.value,
                    sv.percent * dec!(100)
                );
            }
        }
    }
}
