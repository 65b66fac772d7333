use crate::scene::{Object3D, Scene};

/// Compute world transform matrices for every object in the scene.
pub fn update_world_transforms(scene: &mut Scene) {
    for object in scene.objects_mut() {
        compute_world_transforms(object);
    }
}

/// Compute world matrices for one object's nodes.
/// Nodes are stored parents-first, so a single forward pass composes
/// parent * local all the way down.
pub fn compute_world_transforms(object: &mut Object3D) {
    let root = object.root_matrix();

    for i in 0..object.nodes.len() {
        let local = object.nodes[i].transform.matrix();

        let parent_world = match object.nodes[i].parent {
            Some(parent_idx) if parent_idx < i => object.nodes[parent_idx].world,
            _ => root,
        };

        object.nodes[i].world = parent_world * local;
    }
}
