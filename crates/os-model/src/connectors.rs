//! Splitter and mixer capabilities, and the plain connector objects.

use os_core::ObjectId;
use tracing::debug;

use crate::model::Model;

/// One inlet, `n` contiguous outlet ports.
pub trait Splitter: Copy {
    fn id(&self) -> ObjectId;

    fn inlet_object(&self, model: &Model) -> Option<ObjectId> {
        model.inlet_object(self.id(), 0)
    }

    /// Objects fed by each outlet port, in port order.
    fn outlet_objects(&self, model: &Model) -> Vec<ObjectId> {
        model
            .outlet_ports(self.id())
            .into_iter()
            .filter_map(|p| model.outlet_object(self.id(), p))
            .collect()
    }

    fn outlet_object(&self, model: &Model, branch: u32) -> Option<ObjectId> {
        model.outlet_object(self.id(), branch)
    }

    fn last_outlet_object(&self, model: &Model) -> Option<ObjectId> {
        self.outlet_objects(model).last().copied()
    }

    /// Port index whose outlet feeds `object`.
    fn branch_index_for_outlet_object(&self, model: &Model, object: ObjectId) -> Option<u32> {
        model
            .outlet_ports(self.id())
            .into_iter()
            .find(|p| model.outlet_object(self.id(), *p) == Some(object))
    }

    /// One past the last connected outlet port.
    fn next_outlet_port(&self, model: &Model) -> u32 {
        model
            .outlet_ports(self.id())
            .last()
            .map_or(0, |p| p + 1)
    }

    /// Drop outlet port `branch` and shift the later ports down by one so
    /// branch indices stay contiguous.
    fn remove_port_for_branch(&self, model: &mut Model, branch: u32) {
        let id = self.id();
        model.disconnect_outlet(id, branch);
        let later: Vec<u32> = model
            .outlet_ports(id)
            .into_iter()
            .filter(|p| *p > branch)
            .collect();
        for p in later {
            if let Some(target) = model.disconnect_outlet(id, p) {
                model.connect(id, p - 1, target.object, target.index);
            }
        }
        debug!(splitter = %id, branch, "remove splitter port");
    }
}

/// `n` contiguous inlet ports, one outlet.
pub trait Mixer: Copy {
    fn id(&self) -> ObjectId;

    fn outlet_object(&self, model: &Model) -> Option<ObjectId> {
        model.outlet_object(self.id(), 0)
    }

    fn inlet_objects(&self, model: &Model) -> Vec<ObjectId> {
        model
            .inlet_ports(self.id())
            .into_iter()
            .filter_map(|p| model.inlet_object(self.id(), p))
            .collect()
    }

    fn inlet_object(&self, model: &Model, branch: u32) -> Option<ObjectId> {
        model.inlet_object(self.id(), branch)
    }

    fn branch_index_for_inlet_object(&self, model: &Model, object: ObjectId) -> Option<u32> {
        model
            .inlet_ports(self.id())
            .into_iter()
            .find(|p| model.inlet_object(self.id(), *p) == Some(object))
    }

    fn next_inlet_port(&self, model: &Model) -> u32 {
        model.inlet_ports(self.id()).last().map_or(0, |p| p + 1)
    }

    fn remove_port_for_branch(&self, model: &mut Model, branch: u32) {
        let id = self.id();
        model.disconnect_inlet(id, branch);
        let later: Vec<u32> = model
            .inlet_ports(id)
            .into_iter()
            .filter(|p| *p > branch)
            .collect();
        for p in later {
            if let Some(source) = model.disconnect_inlet(id, p) {
                model.connect(source.object, source.index, id, p - 1);
            }
        }
        debug!(mixer = %id, branch, "remove mixer port");
    }
}

macro_rules! handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) ObjectId);

        impl $name {
            pub fn id(self) -> ObjectId {
                self.0
            }
        }
    };
}
pub(crate) use handle;

handle!(
    /// Plant loop splitter.
    ConnectorSplitter
);
handle!(
    /// Plant loop mixer.
    ConnectorMixer
);
handle!(
    /// Air loop demand-side splitter feeding zone branches.
    ZoneSplitter
);
handle!(
    /// Air loop demand-side mixer collecting zone returns.
    ZoneMixer
);

impl Splitter for ConnectorSplitter {
    fn id(&self) -> ObjectId {
        self.0
    }
}

impl Mixer for ConnectorMixer {
    fn id(&self) -> ObjectId {
        self.0
    }
}

impl Splitter for ZoneSplitter {
    fn id(&self) -> ObjectId {
        self.0
    }
}

impl Mixer for ZoneMixer {
    fn id(&self) -> ObjectId {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{NodeData, ObjectKind};

    #[test]
    fn removing_a_branch_compacts_ports() {
        let mut m = Model::new();
        let s = ConnectorSplitter(m.add_object(ObjectKind::ConnectorSplitter));
        let nodes: Vec<_> = (0..3)
            .map(|_| m.add_object(ObjectKind::Node(NodeData::default())))
            .collect();
        for (i, n) in nodes.iter().enumerate() {
            m.connect(s.0, i as u32, *n, 0);
        }
        assert_eq!(s.next_outlet_port(&m), 3);
        assert_eq!(s.branch_index_for_outlet_object(&m, nodes[2]), Some(2));

        s.remove_port_for_branch(&mut m, 0);
        assert_eq!(s.outlet_objects(&m), vec![nodes[1], nodes[2]]);
        assert_eq!(s.branch_index_for_outlet_object(&m, nodes[2]), Some(1));
        assert_eq!(s.next_outlet_port(&m), 2);
        assert_eq!(m.inlet_object(nodes[0], 0), None);
    }

    #[test]
    fn mixer_branch_index() {
        let mut m = Model::new();
        let x = ConnectorMixer(m.add_object(ObjectKind::ConnectorMixer));
        let a = m.add_object(ObjectKind::Node(NodeData::default()));
        let b = m.add_object(ObjectKind::Node(NodeData::default()));
        m.connect(a, 0, x.0, 0);
        m.connect(b, 0, x.0, 1);
        assert_eq!(x.branch_index_for_inlet_object(&m, b), Some(1));
        x.remove_port_for_branch(&mut m, 0);
        assert_eq!(x.inlet_objects(&m), vec![b]);
        assert_eq!(x.next_inlet_port(&m), 1);
    }
}
