//! Fragment merger
//!
//! Each active criterion declares the customer fields it needs as a small
//! selection tree. The trees are merged by field name into one document, so
//! two criteria that both need recent orders share a single `orders(...)`
//! selection (the Admin API rejects sibling selections of the same field
//! with different arguments).

use crate::config::CompilerLimits;
use crate::criteria::{self, CriterionId};
use audience_types::FilterConfig;
use std::fmt::Write as _;
use tracing::{debug, warn};

/// `customers` connection (2) plus its `pageInfo` object (1)
const CUSTOMERS_OVERHEAD: usize = 3;

/// One field in a GraphQL selection set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub args: Option<String>,
    pub children: Vec<Selection>,
}

impl Selection {
    pub fn leaf(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: None,
            children: Vec::new(),
        }
    }

    pub fn node(name: &str, children: Vec<Selection>) -> Self {
        Self {
            name: name.to_string(),
            args: None,
            children,
        }
    }

    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.args = Some(args.into());
        self
    }

    /// `N` from a `first: N` argument
    pub fn first_arg(&self) -> Option<usize> {
        self.args
            .as_deref()?
            .split(',')
            .filter_map(|part| part.split_once(':'))
            .find(|(key, _)| key.trim() == "first")
            .and_then(|(_, value)| value.trim().parse().ok())
    }

    /// Requested cost of this field inside one parent node.
    ///
    /// Scalars are free, objects cost 1 plus their fields, connections cost 2
    /// plus `first` times one node.
    pub fn requested_cost(&self) -> usize {
        if self.children.is_empty() {
            return 0;
        }
        let nodes = self.children.iter().find(|c| c.name == "nodes");
        match (self.first_arg(), nodes) {
            (Some(first), Some(nodes)) => 2 + first * node_cost(&nodes.children),
            _ => node_cost(&self.children),
        }
    }

    fn render(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{}{}", indent, self.name);
        if let Some(args) = &self.args {
            let _ = write!(out, "({})", args);
        }
        if self.children.is_empty() {
            out.push('\n');
            return;
        }
        out.push_str(" {\n");
        for child in &self.children {
            child.render(out, depth + 1);
        }
        let _ = writeln!(out, "{}}}", indent);
    }
}

/// Merge `incoming` into `target`, field by field.
///
/// Same-named fields collapse into one and their children merge
/// recursively. The first arguments seen for a field are kept.
pub fn merge_selections(target: &mut Vec<Selection>, incoming: Vec<Selection>) {
    for sel in incoming {
        match target.iter_mut().find(|t| t.name == sel.name) {
            Some(existing) => {
                if existing.args.is_none() {
                    existing.args = sel.args;
                }
                merge_selections(&mut existing.children, sel.children);
            }
            None => target.push(sel),
        }
    }
}

/// Cost of one object whose selected fields are `fields`
pub fn node_cost(fields: &[Selection]) -> usize {
    1 + fields.iter().map(Selection::requested_cost).sum::<usize>()
}

fn orders_args(first: usize) -> String {
    format!("first: {}, sortKey: CREATED_AT, reverse: true", first)
}

/// `orders(first: N, sortKey: CREATED_AT, reverse: true) { nodes { .. } }`
pub fn orders_fragment(limits: &CompilerLimits, order_fields: Vec<Selection>) -> Selection {
    Selection::node("orders", vec![Selection::node("nodes", order_fields)])
        .with_args(orders_args(limits.orders_per_customer))
}

/// Fields every fetch selects regardless of active criteria
pub fn baseline_fragment() -> Vec<Selection> {
    vec![
        Selection::leaf("id"),
        Selection::leaf("displayName"),
        Selection::leaf("email"),
        Selection::leaf("createdAt"),
        Selection::leaf("numberOfOrders"),
        Selection::node(
            "amountSpent",
            vec![Selection::leaf("amount"), Selection::leaf("currencyCode")],
        ),
        Selection::node("defaultAddress", vec![Selection::leaf("country")]),
    ]
}

/// Merged field selection and page size for one run. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSpec {
    /// Fields selected on each customer node
    pub selections: Vec<Selection>,
    pub batch_size: usize,
    /// Criteria that contributed fragments, in registry order
    pub active: Vec<CriterionId>,
}

impl FetchSpec {
    /// True when nested order data is selected
    pub fn needs_order_data(&self) -> bool {
        self.find(&["orders"]).is_some()
    }

    /// Walk a path of field names from the customer node
    pub fn find(&self, path: &[&str]) -> Option<&Selection> {
        let (first, rest) = path.split_first()?;
        let mut current = self.selections.iter().find(|s| s.name == *first)?;
        for name in rest {
            current = current.children.iter().find(|s| s.name == *name)?;
        }
        Some(current)
    }

    /// Cost of one customer node
    pub fn per_customer_cost(&self) -> usize {
        node_cost(&self.selections)
    }

    /// Requested cost of one full page
    pub fn requested_cost(&self) -> usize {
        CUSTOMERS_OVERHEAD + self.batch_size * self.per_customer_cost()
    }

    /// The paginated `customers` query document.
    ///
    /// Variables: `$first: Int!`, `$after: String`.
    pub fn render_query(&self) -> String {
        let mut out = String::from(
            "query AudienceCandidates($first: Int!, $after: String) {\n  customers(first: $first, after: $after) {\n    pageInfo {\n      hasNextPage\n      endCursor\n    }\n    nodes {\n",
        );
        for sel in &self.selections {
            sel.render(&mut out, 3);
        }
        out.push_str("    }\n  }\n}\n");
        out
    }
}

/// Union the fragments of every active criterion into one fetch spec.
///
/// The page size drops to `reduced_batch_size` whenever a criterion needs
/// nested order data. The recent-orders window then shrinks until a full
/// page stays within `max_query_cost`; only if one order per customer is
/// still too expensive does the page size drop further.
pub fn build_fetch_spec(config: &FilterConfig, limits: &CompilerLimits) -> FetchSpec {
    let active = criteria::active(config);

    let mut selections = baseline_fragment();
    for criterion in &active {
        merge_selections(&mut selections, criterion.fragment(limits));
    }

    let nested = active.iter().any(|c| c.needs_order_data());
    let mut batch_size = if nested {
        limits.reduced_batch_size
    } else {
        limits.default_batch_size
    };

    let budget = limits.max_query_cost.saturating_sub(CUSTOMERS_OVERHEAD);
    if nested {
        fit_orders_window(&mut selections, budget / batch_size.max(1), limits);
    }

    let per_customer = node_cost(&selections);
    let affordable = (budget / per_customer).max(1);
    if affordable < batch_size {
        warn!(
            batch_size,
            affordable,
            per_customer,
            "Selection too expensive for the configured page size, shrinking pages"
        );
        batch_size = affordable;
    }

    FetchSpec {
        selections,
        batch_size,
        active: active.iter().map(|c| c.id()).collect(),
    }
}

/// Shrink `orders(first: N)` so one customer costs at most `per_customer_budget`
fn fit_orders_window(selections: &mut [Selection], per_customer_budget: usize, limits: &CompilerLimits) {
    let Some(index) = selections.iter().position(|s| s.name == "orders") else {
        return;
    };
    let without_orders = node_cost(selections) - selections[index].requested_cost();
    let orders = &mut selections[index];
    let per_order = orders
        .children
        .iter()
        .find(|c| c.name == "nodes")
        .map(|n| node_cost(&n.children))
        .unwrap_or(1);

    let room = per_customer_budget.saturating_sub(without_orders + 2);
    let window = (room / per_order).clamp(1, limits.orders_per_customer.max(1));
    if window < limits.orders_per_customer {
        debug!(
            window,
            per_order,
            "Recent-orders window narrowed to fit the query cost ceiling"
        );
    }
    orders.args = Some(orders_args(window));
}
