//! The rig document: objects, their groups, and the preset store.

use serde::{Deserialize, Serialize};

use crate::group::Group;
use crate::preset::Preset;
use crate::tracker::{GroupTrackerConfig, TrackerConfigSet};

/// Stable key for a group across the whole rig.
pub fn group_uid(object: &str, group: &str) -> String {
    format!("{object}_{group}")
}

/// One host object owning zero or more groups.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RigObject {
    pub name: String,
    pub groups: Vec<Group>,

    /// Index of the group legacy single-vector input applies to.
    pub active_group: usize,
}

impl RigObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn active_group(&self) -> Option<&Group> {
        self.groups.get(self.active_group)
    }

    pub fn active_group_mut(&mut self) -> Option<&mut Group> {
        self.groups.get_mut(self.active_group)
    }
}

/// Every object and group known to the session, plus global presets.
///
/// The consumer loop is the single writer of this state; producers only
/// ever publish into their own snapshot cell or queue.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rig {
    pub objects: Vec<RigObject>,
    pub presets: Vec<Preset>,
}

impl Rig {
    /// UIDs of every group, in rig order.
    pub fn group_uids(&self) -> Vec<String> {
        self.objects
            .iter()
            .flat_map(|obj| {
                obj.groups
                    .iter()
                    .map(|group| group_uid(&obj.name, &group.name))
            })
            .collect()
    }

    /// Visit every group mutably together with its owning object name.
    pub fn for_each_group_mut(&mut self, mut visit: impl FnMut(&str, &mut Group)) {
        for object in &mut self.objects {
            for group in &mut object.groups {
                visit(&object.name, group);
            }
        }
    }

    /// Find a group by UID, returning the owning object name with it.
    pub fn find_group_mut(&mut self, uid: &str) -> Option<(&str, &mut Group)> {
        for object in &mut self.objects {
            let object_name = object.name.as_str();
            for group in &mut object.groups {
                if group_uid(object_name, &group.name) == uid {
                    return Some((object_name, group));
                }
            }
        }
        None
    }

    /// Snapshot tracker settings into the immutable per-tick set.
    pub fn tracker_configs(&self) -> TrackerConfigSet {
        TrackerConfigSet {
            groups: self
                .objects
                .iter()
                .flat_map(|obj| {
                    obj.groups.iter().map(|group| GroupTrackerConfig {
                        uid: group_uid(&obj.name, &group.name),
                        x: group.tracker_x,
                        y: group.tracker_y,
                    })
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_object_rig() -> Rig {
        let mut face = RigObject::new("Face");
        face.groups.push(Group::new("Mouth"));
        face.groups.push(Group::new("Brows"));
        let mut body = RigObject::new("Body");
        body.groups.push(Group::new("Lean"));
        Rig {
            objects: vec![face, body],
            presets: Vec::new(),
        }
    }

    #[test]
    fn test_group_uids_in_rig_order() {
        let rig = two_object_rig();
        assert_eq!(rig.group_uids(), ["Face_Mouth", "Face_Brows", "Body_Lean"]);
    }

    #[test]
    fn test_find_group_by_uid() {
        let mut rig = two_object_rig();
        let (object, group) = rig.find_group_mut("Body_Lean").unwrap();
        assert_eq!(object, "Body");
        assert_eq!(group.name, "Lean");
        assert!(rig.find_group_mut("Body_Missing").is_none());
    }

    #[test]
    fn test_tracker_config_snapshot_covers_all_groups() {
        let rig = two_object_rig();
        let configs = rig.tracker_configs();
        assert_eq!(configs.groups.len(), 3);
        assert_eq!(configs.groups[0].uid, "Face_Mouth");
        // Default axes are inert, so no group counts as active.
        assert_eq!(configs.active_groups().count(), 0);
    }
}
