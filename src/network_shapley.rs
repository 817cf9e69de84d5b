use crate::{
    coalition_computation::{
        calculate_shapley_values, compute_expected_values, enumerate_operators,
        generate_coalition_bitmap, solve_coalition_values,
    },
    lp,
    types::{DemandMatrix, PrivateLinks, PublicLinks, Result, ShapleyValue, decimal_to_f64},
    validation::validate_operator_names,
};
use faer::Par;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

/// Run the full pipeline: consolidate the map, assemble the LP primitives,
/// solve every coalition, take expectations over operator uptime, and
/// aggregate into Shapley values.
pub fn network_shapley(
    private_links: &PrivateLinks,
    public_links: &PublicLinks,
    demand: &DemandMatrix,
    operator_uptime: Decimal,
    hybrid_penalty: Decimal,
    demand_multiplier: Decimal,
) -> Result<Vec<ShapleyValue>> {
    faer::set_global_parallelism(Par::rayon(0));

    let operators = enumerate_operators(&private_links.links);
    validate_operator_names(&operators)?;
    let n_ops = operators.len();

    if n_ops == 0 {
        return Ok(vec![ShapleyValue {
            operator: "NONE".to_string(),
            value: Decimal::ZERO,
            percent: Decimal::ZERO,
        }]);
    }

    let bitmap = generate_coalition_bitmap(n_ops);

    let full_map = lp::consolidate_map(private_links, public_links, demand, hybrid_penalty)?;
    let primitives = lp::primitives(&full_map, demand, demand_multiplier)?;

    let (svalue, size) = solve_coalition_values(&operators, &bitmap, &primitives)?;
    let evalue = compute_expected_values(&svalue, &size, decimal_to_f64(operator_uptime), n_ops)?;

    calculate_shapley_values(&operators, &evalue, &size, n_ops)
}

/// A fully-configured Shapley computation, ready to run.
#[derive(Debug, Clone)]
pub struct NetworkShapley {
    private_links: PrivateLinks,
    public_links: PublicLinks,
    demand: DemandMatrix,
    operator_uptime: Decimal,
    hybrid_penalty: Decimal,
    demand_multiplier: Decimal,
}

impl NetworkShapley {
    /// Solve for each operator's Shapley value under this configuration.
    pub fn compute(&self) -> Result<Vec<ShapleyValue>> {
        network_shapley(
            &self.private_links,
            &self.public_links,
            &self.demand,
            self.operator_uptime,
            self.hybrid_penalty,
            self.demand_multiplier,
        )
    }
}

#[derive(Debug, Error)]
pub enum NetworkShapleyBuilderError {
    #[error("private links are required")]
    MissingPrivateLinks,
    #[error("public links are required")]
    MissingPublicLinks,
    #[error("a demand matrix is required")]
    MissingDemand,
}

/// Builder for [`NetworkShapley`]. `new` pre-fills the three required
/// tables; `default` leaves them unset and `build` fails if any is missing.
/// `operator_uptime`/`hybrid_penalty`/`demand_multiplier` default to 1.0,
/// 5.0, and 1.0 respectively either way.
#[derive(Debug, Clone)]
pub struct NetworkShapleyBuilder {
    private_links: Option<PrivateLinks>,
    public_links: Option<PublicLinks>,
    demand: Option<DemandMatrix>,
    operator_uptime: Decimal,
    hybrid_penalty: Decimal,
    demand_multiplier: Decimal,
}

impl Default for NetworkShapleyBuilder {
    fn default() -> Self {
        NetworkShapleyBuilder {
            private_links: None,
            public_links: None,
            demand: None,
            operator_uptime: Decimal::ONE,
            hybrid_penalty: dec!(5.0),
            demand_multiplier: Decimal::ONE,
        }
    }
}

impl NetworkShapleyBuilder {
    pub fn new(
        private_links: PrivateLinks,
        public_links: PublicLinks,
        demand: DemandMatrix,
    ) -> Self {
        NetworkShapleyBuilder {
            private_links: Some(private_links),
            public_links: Some(public_links),
            demand: Some(demand),
            ..Self::default()
        }
    }

    pub fn private_links(mut self, private_links: PrivateLinks) -> Self {
        self.private_links = Some(private_links);
        self
    }

    pub fn public_links(mut self, public_links: PublicLinks) -> Self {
        self.public_links = Some(public_links);
        self
    }

    pub fn demand(mut self, demand: DemandMatrix) -> Self {
        self.demand = Some(demand);
        self
    }

    pub fn operator_uptime(mut self, operator_uptime: Decimal) -> Self {
        self.operator_uptime = operator_uptime;
        self
    }

    pub fn hybrid_penalty(mut self, hybrid_penalty: Decimal) -> Self {
        self.hybrid_penalty = hybrid_penalty;
        self
    }

    pub fn demand_multiplier(mut self, demand_multiplier: Decimal) -> Self {
        self.demand_multiplier = demand_multiplier;
        self
    }

    pub fn build(self) -> std::result::Result<NetworkShapley, NetworkShapleyBuilderError> {
        Ok(NetworkShapley {
            private_links: self
                .private_links
                .ok_or(NetworkShapleyBuilderError::MissingPrivateLinks)?,
            public_links: self
                .public_links
                .ok_or(NetworkShapleyBuilderError::MissingPublicLinks)?,
            demand: self.demand.ok_or(NetworkShapleyBuilderError::MissingDemand)?,
            operator_uptime: self.operator_uptime,
            hybrid_penalty: self.hybrid_penalty,
            demand_multiplier: self.demand_multiplier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Demand, Link};
    use rust_decimal_macros::dec;

    fn create_example_private_links() -> PrivateLinks {
        let links = vec![
            {
                let mut link = Link::new("FRA1".to_string(), "NYC1".to_string());
                link.cost = dec!(40);
                link.bandwidth = dec!(10);
                link.operator1 = "Alpha".to_string();
                link.operator2 = "0".to_string();
                link.uptime = dec!(1);
                link.shared = 0;
                link
            },
            {
                let mut link = Link::new("FRA1".to_string(), "SIN1".to_string());
                link.cost = dec!(50);
                link.bandwidth = dec!(10);
                link.operator1 = "Beta".to_string();
                link.operator2 = "0".to_string();
                link.uptime = dec!(1);
                link.shared = 0;
                link
            },
            {
                let mut link = Link::new("SIN1".to_string(), "NYC1".to_string());
                link.cost = dec!(80);
                link.bandwidth = dec!(10);
                link.operator1 = "Gamma".to_string();
                link.operator2 = "0".to_string();
                link.uptime = dec!(1);
                link.shared = 0;
                link
            },
        ];
        PrivateLinks::from_links(links)
    }

    fn create_example_public_links() -> PublicLinks {
        let links = vec![
            {
                let mut link = Link::new("FRA1".to_string(), "NYC1".to_string());
                link.cost = dec!(70);
                link
            },
            {
                let mut link = Link::new("FRA1".to_string(), "SIN1".to_string());
                link.cost = dec!(80);
                link
            },
            {
                let mut link = Link::new("SIN1".to_string(), "NYC1".to_string());
                link.cost = dec!(120);
                link
            },
        ];
        PublicLinks::from_links(links)
    }

    fn create_example_demand() -> DemandMatrix {
        let demands = vec![
            Demand::new("SIN".to_string(), "NYC".to_string(), dec!(5), 1),
            Demand::new("SIN".to_string(), "FRA".to_string(), dec!(5), 1),
        ];
        DemandMatrix::from_demands(demands)
    }

    #[test]
    fn test_network_shapley_example() {
        let private_links = create_example_private_links();
        let public_links = create_example_public_links();
        let demand = create_example_demand();

        let result = network_shapley(
            &private_links,
            &public_links,
            &demand,
            dec!(0.98),
            dec!(5.0),
            dec!(1.0),
        )
        .unwrap();

        assert_eq!(result.len(), 3);

        let operators: Vec<&str> = result.iter().map(|sv| sv.operator.as_str()).collect();
        assert!(operators.contains(&"Alpha"));
        assert!(operators.contains(&"Beta"));
        assert!(operators.contains(&"Gamma"));

        let total: Decimal = result.iter().map(|sv| sv.percent).sum();
        assert_eq!(total, dec!(1.0));

        assert!(result.iter().all(|sv| sv.percent >= dec!(0)));
    }

    #[test]
    fn test_builder_new_is_ready_to_compute() {
        let engine = NetworkShapleyBuilder::new(
            create_example_private_links(),
            create_example_public_links(),
            create_example_demand(),
        )
        .operator_uptime(dec!(0.98))
        .build()
        .unwrap();

        let result = engine.compute().unwrap();
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_builder_default_requires_all_tables() {
        let err = NetworkShapleyBuilder::default()
            .private_links(create_example_private_links())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            NetworkShapleyBuilderError::MissingPublicLinks
        ));
    }
}
