use faer::{Col, sparse::SparseColMat};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use thiserror::Error;

#[cfg(feature = "csv")]
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, crate::error::ShapleyError>;

/// A single edge in the network map: a private link (owned by one or two
/// operators), a public underlay link (operator "0"), or a zero-cost helper
/// edge generated during map consolidation. All three share this shape —
/// only the populated fields differ.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "csv", derive(Serialize, Deserialize))]
pub struct Link {
    #[cfg_attr(feature = "csv", serde(rename = "Start"))]
    pub start: String,
    #[cfg_attr(feature = "csv", serde(rename = "End"))]
    pub end: String,
    #[cfg_attr(feature = "csv", serde(rename = "Cost", default))]
    pub cost: Decimal,
    #[cfg_attr(feature = "csv", serde(rename = "Bandwidth", default))]
    pub bandwidth: Decimal,
    #[cfg_attr(
        feature = "csv",
        serde(rename = "Operator1", default = "default_operator")
    )]
    pub operator1: String,
    #[cfg_attr(
        feature = "csv",
        serde(rename = "Operator2", default = "default_operator")
    )]
    pub operator2: String,
    #[cfg_attr(feature = "csv", serde(rename = "Uptime", default = "default_uptime"))]
    pub uptime: Decimal,
    #[cfg_attr(feature = "csv", serde(rename = "Shared", default))]
    pub shared: usize,
    /// Traffic `Type` this link is restricted to; 0 means "all types" (the
    /// value every private/public link carries before helper-edge generation
    /// assigns a specific commodity).
    #[cfg_attr(feature = "csv", serde(skip))]
    pub link_type: usize,
}

#[cfg(feature = "csv")]
fn default_operator() -> String {
    "0".to_string()
}

#[cfg(feature = "csv")]
fn default_uptime() -> Decimal {
    Decimal::ONE
}

impl Link {
    /// A link between two named switches with every other field at its
    /// neutral default (public-operator, full uptime, no shared group).
    pub fn new(start: String, end: String) -> Self {
        Link {
            start,
            end,
            cost: Decimal::ZERO,
            bandwidth: Decimal::ZERO,
            operator1: "0".to_string(),
            operator2: "0".to_string(),
            uptime: Decimal::ONE,
            shared: 0,
            link_type: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum LinkBuilderError {
    #[error("link requires both a start and end switch")]
    MissingEndpoints,
}

/// Builder for [`Link`]. `new` pre-fills the two required fields; `default`
/// leaves them unset and `build` fails if they're never supplied.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    start: Option<String>,
    end: Option<String>,
    cost: Decimal,
    bandwidth: Decimal,
    operator1: String,
    operator2: String,
    uptime: Decimal,
    shared: usize,
    link_type: usize,
}

impl Default for LinkBuilder {
    fn default() -> Self {
        LinkBuilder {
            start: None,
            end: None,
            cost: Decimal::ZERO,
            bandwidth: Decimal::ZERO,
            operator1: "0".to_string(),
            operator2: "0".to_string(),
            uptime: Decimal::ONE,
            shared: 0,
            link_type: 0,
        }
    }
}

impl LinkBuilder {
    pub fn new(start: String, end: String) -> Self {
        LinkBuilder {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn start(mut self, start: String) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: String) -> Self {
        self.end = Some(end);
        self
    }

    pub fn cost(mut self, cost: Decimal) -> Self {
        self.cost = cost;
        self
    }

    pub fn bandwidth(mut self, bandwidth: Decimal) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    pub fn operator1(mut self, operator1: String) -> Self {
        self.operator1 = operator1;
        self
    }

    pub fn operator2(mut self, operator2: String) -> Self {
        self.operator2 = operator2;
        self
    }

    pub fn uptime(mut self, uptime: Decimal) -> Self {
        self.uptime = uptime;
        self
    }

    pub fn shared(mut self, shared: usize) -> Self {
        self.shared = shared;
        self
    }

    pub fn link_type(mut self, link_type: usize) -> Self {
        self.link_type = link_type;
        self
    }

    pub fn build(self) -> std::result::Result<Link, LinkBuilderError> {
        let start = self.start.ok_or(LinkBuilderError::MissingEndpoints)?;
        let end = self.end.ok_or(LinkBuilderError::MissingEndpoints)?;
        Ok(Link {
            start,
            end,
            cost: self.cost,
            bandwidth: self.bandwidth,
            operator1: self.operator1,
            operator2: self.operator2,
            uptime: self.uptime,
            shared: self.shared,
            link_type: self.link_type,
        })
    }
}

/// The table of private links supplied by participating operators.
#[derive(Debug, Clone, Default)]
pub struct PrivateLinks {
    pub links: Vec<Link>,
}

impl PrivateLinks {
    pub fn from_links(links: Vec<Link>) -> Self {
        PrivateLinks { links }
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[cfg(feature = "csv")]
    pub fn from_csv(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(PrivateLinks::from_links(read_links_csv(path)?))
    }
}

/// The table of public (shared underlay) links.
#[derive(Debug, Clone, Default)]
pub struct PublicLinks {
    pub links: Vec<Link>,
}

impl PublicLinks {
    pub fn from_links(links: Vec<Link>) -> Self {
        PublicLinks { links }
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[cfg(feature = "csv")]
    pub fn from_csv(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(PublicLinks::from_links(read_links_csv(path)?))
    }
}

#[cfg(feature = "csv")]
fn read_links_csv(path: impl AsRef<std::path::Path>) -> Result<Vec<Link>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| crate::error::ShapleyError::ComputationError(e.to_string()))?;
    let mut links = Vec::new();
    for record in reader.deserialize() {
        let link: Link =
            record.map_err(|e| crate::error::ShapleyError::ComputationError(e.to_string()))?;
        links.push(link);
    }
    Ok(links)
}

/// One row of the demand matrix: `traffic` units of commodity
/// `demand_type` flowing from city `start` to city `end`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "csv", derive(Serialize, Deserialize))]
pub struct Demand {
    #[cfg_attr(feature = "csv", serde(rename = "Start"))]
    pub start: String,
    #[cfg_attr(feature = "csv", serde(rename = "End"))]
    pub end: String,
    #[cfg_attr(feature = "csv", serde(rename = "Traffic"))]
    pub traffic: Decimal,
    #[cfg_attr(feature = "csv", serde(rename = "Type"))]
    pub demand_type: usize,
}

impl Demand {
    pub fn new(start: String, end: String, traffic: Decimal, demand_type: usize) -> Self {
        Demand {
            start,
            end,
            traffic,
            demand_type,
        }
    }
}

#[derive(Debug, Error)]
pub enum DemandBuilderError {
    #[error("demand requires a start and end city")]
    MissingEndpoints,
}

#[derive(Debug, Clone, Default)]
pub struct DemandBuilder {
    start: Option<String>,
    end: Option<String>,
    traffic: Decimal,
    demand_type: usize,
}

impl DemandBuilder {
    pub fn new(start: String, end: String, traffic: Decimal, demand_type: usize) -> Self {
        DemandBuilder {
            start: Some(start),
            end: Some(end),
            traffic,
            demand_type,
        }
    }

    pub fn start(mut self, start: String) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: String) -> Self {
        self.end = Some(end);
        self
    }

    pub fn traffic(mut self, traffic: Decimal) -> Self {
        self.traffic = traffic;
        self
    }

    pub fn demand_type(mut self, demand_type: usize) -> Self {
        self.demand_type = demand_type;
        self
    }

    pub fn build(self) -> std::result::Result<Demand, DemandBuilderError> {
        let start = self.start.ok_or(DemandBuilderError::MissingEndpoints)?;
        let end = self.end.ok_or(DemandBuilderError::MissingEndpoints)?;
        Ok(Demand {
            start,
            end,
            traffic: self.traffic,
            demand_type: self.demand_type,
        })
    }
}

/// The full set of weighted traffic demands to be routed over the network.
#[derive(Debug, Clone, Default)]
pub struct DemandMatrix {
    pub demands: Vec<Demand>,
}

impl DemandMatrix {
    pub fn from_demands(demands: Vec<Demand>) -> Self {
        DemandMatrix { demands }
    }

    /// The distinct traffic `Type` values present, sorted ascending.
    pub fn unique_types(&self) -> Vec<usize> {
        let mut types: Vec<usize> = self
            .demands
            .iter()
            .map(|d| d.demand_type)
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect();
        types.sort_unstable();
        types
    }

    #[cfg(feature = "csv")]
    pub fn from_csv(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| crate::error::ShapleyError::ComputationError(e.to_string()))?;
        let mut demands = Vec::new();
        for record in reader.deserialize() {
            let demand: Demand =
                record.map_err(|e| crate::error::ShapleyError::ComputationError(e.to_string()))?;
            demands.push(demand);
        }
        Ok(DemandMatrix::from_demands(demands))
    }
}

/// The assembled linear-program primitives shared by every coalition solve:
/// equality rows enforce flow conservation per commodity, inequality rows
/// enforce per-shared-group bandwidth caps. `row_index1/2` and
/// `col_index1/2` carry the operator names aligned to each row/column so a
/// coalition's mask can be built by simple membership lookup.
#[derive(Debug, Clone)]
pub struct LPPrimitives {
    pub a_eq: SparseColMat<usize, f64>,
    pub a_ub: SparseColMat<usize, f64>,
    pub b_eq: Col<f64>,
    pub b_ub: Col<f64>,
    pub cost: Col<f64>,
    pub row_index1: Vec<String>,
    pub row_index2: Vec<String>,
    pub col_index1: Vec<String>,
    pub col_index2: Vec<String>,
}

/// A single operator's attributed Shapley value and its share of the total.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "csv", derive(Serialize, tabled::Tabled))]
#[cfg_attr(feature = "borsh", derive(borsh::BorshSerialize, borsh::BorshDeserialize))]
pub struct ShapleyValue {
    #[cfg_attr(feature = "csv", serde(rename = "Operator"), tabled(rename = "Operator"))]
    pub operator: String,
    #[cfg_attr(feature = "csv", serde(rename = "Value"), tabled(rename = "Value"))]
    pub value: Decimal,
    #[cfg_attr(feature = "csv", serde(rename = "Percent"), tabled(rename = "Percent"))]
    pub percent: Decimal,
}

/// Convert a `Decimal` input to the `f64` the LP solver operates on.
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Convert an `f64` LP result back to `Decimal` for external reporting.
pub fn f64_to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Round to 4 decimal places, matching the precision of the published
/// Value/Percent columns.
pub fn round_decimal(value: Decimal) -> Decimal {
    value.round_dp(4)
}
