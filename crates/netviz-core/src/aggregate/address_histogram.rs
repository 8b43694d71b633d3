//! Top talkers by address, derived from an [`IpTree`].

use super::Relationship;
use super::count_histogram::{CountHistogram, CountPair};
use super::iptree::IpTree;
use crate::render::plot::PlotStyle;
use crate::render::{Bounds, Rgb, Surface};

/// Ranked addresses and prefixes for one side of a conversation.
///
/// Built on demand from the tree; its count sum is the tree total.
#[derive(Debug, Clone)]
pub struct AddressHistogram {
    parent: CountHistogram,
}

impl AddressHistogram {
    pub fn from_iptree(relationship: Relationship, title: &str, tree: &IpTree) -> Self {
        let mut parent = CountHistogram::new(PlotStyle {
            pad_left_factor: 0.45,
            ..PlotStyle::titled(title)
        });
        parent.bar_color = match relationship {
            Relationship::Source => Rgb::BLUE,
            Relationship::Destination => Rgb::PURPLE,
        };
        for (label, count) in tree.entries() {
            parent.increment(label, count);
        }
        Self { parent }
    }

    pub fn get_count_sum(&self) -> u64 {
        self.parent.get_count_sum()
    }

    pub fn get_top_list(&self) -> Vec<CountPair> {
        self.parent.get_top_list()
    }

    pub fn render(&self, surface: &mut dyn Surface, bounds: Bounds) {
        self.parent.render(surface, bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_iptree() {
        let mut tree = IpTree::default();
        for _ in 0..3 {
            tree.add(&[10, 0, 0, 1]);
        }
        tree.add(&[10, 0, 0, 2]);

        let h = AddressHistogram::from_iptree(Relationship::Source, "Top Source Addresses", &tree);
        assert_eq!(h.get_count_sum(), 4);
        assert_eq!(
            h.get_top_list(),
            vec![("10.0.0.1".to_string(), 3), ("10.0.0.2".to_string(), 1)]
        );
    }

    #[test]
    fn test_empty_tree() {
        let h = AddressHistogram::from_iptree(Relationship::Destination, "t", &IpTree::default());
        assert_eq!(h.get_count_sum(), 0);
        assert!(h.get_top_list().is_empty());
    }
}
