//! Directed walks over the port graph.

use std::collections::{HashMap, HashSet};

use os_core::ObjectId;

use crate::model::{Model, Port};
use crate::objects::{Branching, ObjectType};

/// A walk state: the object and the inlet port the walk entered through.
type State = Port;

impl Model {
    fn successors(&self, state: State, end: ObjectId) -> Vec<State> {
        if state.object == end {
            return Vec::new();
        }
        let Some(ty) = self.object_type(state.object) else {
            return Vec::new();
        };
        let outlets = match ty.branching() {
            Branching::Splitter => self.outlet_ports(state.object),
            Branching::Mixer => vec![0],
            Branching::Straight => vec![state.index],
        };
        outlets
            .into_iter()
            .filter_map(|o| self.downstream_port(state.object, o))
            .collect()
    }

    fn reaches(&self, state: State, end: ObjectId, memo: &mut HashMap<State, bool>) -> bool {
        if let Some(&known) = memo.get(&state) {
            return known;
        }
        // provisional entry guards against cycles
        memo.insert(state, false);
        // every successor gets a memo entry; postorder reads them all
        let mut found = state.object == end;
        for next in self.successors(state, end) {
            found |= self.reaches(next, end, memo);
        }
        memo.insert(state, found);
        found
    }

    fn postorder(
        &self,
        state: State,
        end: ObjectId,
        memo: &HashMap<State, bool>,
        seen: &mut HashSet<State>,
        out: &mut Vec<ObjectId>,
    ) {
        if !seen.insert(state) {
            return;
        }
        let mut next = self.successors(state, end);
        next.reverse();
        for s in next {
            if memo.get(&s).copied().unwrap_or(false) {
                self.postorder(s, end, memo, seen, out);
            }
        }
        out.push(state.object);
    }

    /// Every object on a path from `start` to `end`, both included, in
    /// topological order with splitter branches in port order.
    ///
    /// The walk enters `start` through inlet port 0. Returns an empty list
    /// when `end` cannot be reached.
    pub fn components_between(&self, start: ObjectId, end: ObjectId) -> Vec<ObjectId> {
        self.components_between_from(Port::new(start, 0), end)
    }

    pub(crate) fn components_between_from(&self, start: State, end: ObjectId) -> Vec<ObjectId> {
        if !self.contains(start.object) || !self.contains(end) {
            return Vec::new();
        }
        let mut memo = HashMap::new();
        if !self.reaches(start, end, &mut memo) {
            return Vec::new();
        }
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        self.postorder(start, end, &memo, &mut seen, &mut order);

        // a mixer is reached once per inlet; its first finish is the one
        // that follows all of its downstream objects
        let mut unique = HashSet::new();
        order.retain(|id| unique.insert(*id));
        order.reverse();
        order
    }

    /// Like [`Model::components_between`], keeping only objects of `ty`.
    pub fn components_between_of_type(
        &self,
        start: ObjectId,
        end: ObjectId,
        ty: ObjectType,
    ) -> Vec<ObjectId> {
        self.components_between(start, end)
            .into_iter()
            .filter(|id| self.is_type(*id, ty))
            .collect()
    }

    /// Walk upstream from `object`'s inlet `port` until `stop` returns true
    /// for the next object; returns the last object passed before it.
    pub(crate) fn walk_upstream_until(
        &self,
        object: ObjectId,
        port: u32,
        stop: impl Fn(ObjectId) -> bool,
    ) -> Option<(ObjectId, ObjectId)> {
        let mut current = object;
        let mut inlet = port;
        loop {
            let up = self.upstream_port(current, inlet)?;
            if stop(up.object) {
                return Some((current, up.object));
            }
            current = up.object;
            inlet = match self.object_type(current)?.branching() {
                Branching::Straight => up.index,
                // walks only pass straight components
                _ => return None,
            };
        }
    }

    /// Mirror of [`Model::walk_upstream_until`] following outlets.
    pub(crate) fn walk_downstream_until(
        &self,
        object: ObjectId,
        port: u32,
        stop: impl Fn(ObjectId) -> bool,
    ) -> Option<(ObjectId, ObjectId)> {
        let mut current = object;
        let mut outlet = port;
        loop {
            let down = self.downstream_port(current, outlet)?;
            if stop(down.object) {
                return Some((current, down.object));
            }
            current = down.object;
            outlet = match self.object_type(current)?.branching() {
                Branching::Straight => down.index,
                _ => return None,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{NodeData, ObjectKind};

    fn node(m: &mut Model) -> ObjectId {
        m.add_object(ObjectKind::Node(NodeData::default()))
    }

    /// a -> s -> {b1, b2} -> x -> z
    fn diamond() -> (Model, Vec<ObjectId>) {
        let mut m = Model::new();
        let a = node(&mut m);
        let s = m.add_object(ObjectKind::ConnectorSplitter);
        let b1 = node(&mut m);
        let b2 = node(&mut m);
        let x = m.add_object(ObjectKind::ConnectorMixer);
        let z = node(&mut m);
        m.connect(a, 0, s, 0);
        m.connect(s, 0, b1, 0);
        m.connect(s, 1, b2, 0);
        m.connect(b1, 0, x, 0);
        m.connect(b2, 0, x, 1);
        m.connect(x, 0, z, 0);
        (m, vec![a, s, b1, b2, x, z])
    }

    #[test]
    fn walks_all_branches_in_order() {
        let (m, ids) = diamond();
        assert_eq!(m.components_between(ids[0], ids[5]), ids);
    }

    #[test]
    fn every_branch_of_a_wide_splitter_is_listed() {
        let mut m = Model::new();
        let a = node(&mut m);
        let s = m.add_object(ObjectKind::ConnectorSplitter);
        let x = m.add_object(ObjectKind::ConnectorMixer);
        let z = node(&mut m);
        m.connect(a, 0, s, 0);
        let mut branches = Vec::new();
        for i in 0..3 {
            let first = node(&mut m);
            let second = node(&mut m);
            m.connect(s, i, first, 0);
            m.connect(first, 0, second, 0);
            m.connect(second, 0, x, i);
            branches.push((first, second));
        }
        m.connect(x, 0, z, 0);

        let order = m.components_between(a, z);
        assert_eq!(order.len(), 10);
        assert_eq!(order[..2], [a, s]);
        assert_eq!(order[8..], [x, z]);
        for (i, (first, second)) in branches.iter().enumerate() {
            assert_eq!(order[2 + 2 * i], *first);
            assert_eq!(order[3 + 2 * i], *second);
        }
        // a later branch is found on its own too
        let (last, _) = branches[2];
        assert_eq!(m.components_between(a, last), vec![a, s, last]);
    }

    #[test]
    fn walk_to_branch_node_skips_other_branches() {
        let (m, ids) = diamond();
        assert_eq!(m.components_between(ids[0], ids[3]), vec![ids[0], ids[1], ids[3]]);
    }

    #[test]
    fn unreachable_end_is_empty() {
        let (m, ids) = diamond();
        assert!(m.components_between(ids[5], ids[0]).is_empty());
    }

    #[test]
    fn filter_by_type() {
        let (m, ids) = diamond();
        assert_eq!(
            m.components_between_of_type(ids[0], ids[5], ObjectType::ConnectorMixer),
            vec![ids[4]]
        );
    }
}
