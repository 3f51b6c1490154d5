use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use petgraph::unionfind::UnionFind;

use crate::petri_net::petri_net_struct::{PetriNet, PlaceID};

#[derive(Debug, Clone)]
///
/// Equivalence classes of places that are about to be fused
///
/// Two classes both containing a place of the initial or a final marking are never united,
/// so every class has at most one marking place.
pub struct PlaceClasses {
    classes: UnionFind<usize>,
    marked: Vec<bool>,
}

impl PlaceClasses {
    /// Every place of the net in its own class
    pub fn new(net: &PetriNet) -> Self {
        let mut marked = vec![false; net.place_capacity()];
        for p in net.place_ids() {
            marked[p.index()] = net.is_marking_place(&p);
        }
        Self {
            classes: UnionFind::new(net.place_capacity()),
            marked,
        }
    }

    /// Representative of the class of `p`
    pub fn find(&self, p: PlaceID) -> PlaceID {
        PlaceID(self.classes.find(p.index()))
    }

    /// Check if the class of `p` contains a marking place
    pub fn is_marked(&self, p: PlaceID) -> bool {
        self.marked[self.classes.find(p.index())]
    }

    /// Unite the classes of `p` and `q`
    ///
    /// Returns `false` if they already were the same class or if both contain a marking place.
    pub fn try_union(&mut self, p: PlaceID, q: PlaceID) -> bool {
        let (rp, rq) = (self.find(p), self.find(q));
        if rp == rq || (self.is_marked(rp) && self.is_marked(rq)) {
            return false;
        }
        let marked = self.is_marked(rp) || self.is_marked(rq);
        self.classes.union(rp.index(), rq.index());
        let root = self.classes.find(rp.index());
        self.marked[root] = marked;
        true
    }

    /// Representatives of all classes with more than one place of the net
    pub fn fused_roots(&self, net: &PetriNet) -> BTreeSet<PlaceID> {
        net.place_ids()
            .map(|p| self.find(p))
            .counts()
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(root, _)| root)
            .collect()
    }

    ///
    /// Merge every class of more than one place into a single place
    ///
    /// The marking place of a class survives and takes over the arcs of all others;
    /// a class without marking place is replaced by a new place.
    ///
    /// Returns the fused places and the resulting place per class
    pub fn apply(&self, net: &mut PetriNet) -> Vec<(Vec<PlaceID>, PlaceID)> {
        let mut groups: BTreeMap<PlaceID, Vec<PlaceID>> = BTreeMap::new();
        for p in net.place_ids() {
            groups.entry(self.find(p)).or_default().push(p);
        }
        let mut merged = Vec::new();
        for members in groups.into_values().filter(|m| m.len() > 1) {
            let into = match members.iter().find(|p| net.is_marking_place(p)) {
                Some(p) => *p,
                None => net.add_place(None),
            };
            let fused: Vec<PlaceID> = members.into_iter().filter(|p| *p != into).collect();
            for p in &fused {
                net.merge_place_into(*p, into);
            }
            merged.push((fused, into));
        }
        merged
    }
}
