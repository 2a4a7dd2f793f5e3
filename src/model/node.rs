//! Route events and route helpers.

/// One event in a vehicle route.
///
/// `Depot` marks the implicit start and end at the vehicle's home depot;
/// every well-formed route begins and ends with it and contains it nowhere
/// else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportNode {
    /// Route endpoint at the vehicle's depot.
    Depot,
    /// Loading of the given transport.
    Pickup(usize),
    /// Unloading of the given transport.
    Delivery(usize),
}

impl TransportNode {
    /// The referenced transport, or `None` for the depot.
    pub fn transport(&self) -> Option<usize> {
        match *self {
            TransportNode::Depot => None,
            TransportNode::Pickup(t) | TransportNode::Delivery(t) => Some(t),
        }
    }

    /// Returns `true` for a pickup event.
    pub fn is_pickup(&self) -> bool {
        matches!(self, TransportNode::Pickup(_))
    }

    /// Returns `true` for the depot sentinel.
    pub fn is_depot(&self) -> bool {
        matches!(self, TransportNode::Depot)
    }
}

/// An ordered sequence of route events, depot first and last.
pub type Route = Vec<TransportNode>;

/// A route that serves nothing: depot, depot.
pub fn empty_route() -> Route {
    vec![TransportNode::Depot, TransportNode::Depot]
}

/// Positions of all pickup events.
pub fn pickup_positions(route: &[TransportNode]) -> Vec<usize> {
    route
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_pickup())
        .map(|(i, _)| i)
        .collect()
}

/// Position of the delivery event of `transport`, if present.
pub fn delivery_position(route: &[TransportNode], transport: usize) -> Option<usize> {
    route
        .iter()
        .position(|n| *n == TransportNode::Delivery(transport))
}

/// Transports picked up along the route, in visiting order.
pub fn picked_transports(route: &[TransportNode]) -> Vec<usize> {
    route
        .iter()
        .filter_map(|n| match *n {
            TransportNode::Pickup(t) => Some(t),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use TransportNode::*;

    #[test]
    fn test_empty_route() {
        let r = empty_route();
        assert_eq!(r, vec![Depot, Depot]);
        assert!(pickup_positions(&r).is_empty());
    }

    #[test]
    fn test_positions() {
        let r = vec![Depot, Pickup(2), Pickup(0), Delivery(2), Delivery(0), Depot];
        assert_eq!(pickup_positions(&r), vec![1, 2]);
        assert_eq!(delivery_position(&r, 0), Some(4));
        assert_eq!(delivery_position(&r, 7), None);
        assert_eq!(picked_transports(&r), vec![2, 0]);
    }

    #[test]
    fn test_node_accessors() {
        assert_eq!(Depot.transport(), None);
        assert_eq!(Pickup(3).transport(), Some(3));
        assert!(Pickup(3).is_pickup());
        assert!(!Delivery(3).is_pickup());
        assert!(Depot.is_depot());
    }
}
