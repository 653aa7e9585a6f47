use std::collections::BTreeMap;

use log::info;

use super::object::GameObject;

/// Named game objects, kept in name order.
#[derive(Default)]
pub struct Scene {
    objects: BTreeMap<String, GameObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `object`, renaming it to `name (n)` if its name is taken.
    ///
    /// # Returns
    /// The stored object, for further configuration
    pub fn add_object(&mut self, mut object: GameObject) -> &mut GameObject {
        let name = self.ensure_unique_name(object.name());
        if name != object.name() {
            object.rename(name.clone());
        }
        info!("Added game object '{}'", name);
        self.objects.entry(name).or_insert(object)
    }

    pub fn remove_object(&mut self, name: &str) -> Option<GameObject> {
        self.objects.remove(name)
    }

    pub fn object(&self, name: &str) -> Option<&GameObject> {
        self.objects.get(name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut GameObject> {
        self.objects.get_mut(name)
    }

    /// Gets all object names for UI display
    pub fn object_names(&self) -> Vec<String> {
        self.objects.keys().cloned().collect()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn objects(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values()
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut GameObject> {
        self.objects.values_mut()
    }

    /// Makes sure every object has its mesh and transform buffers.
    pub fn init_gpu_resources(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) {
        for object in self.objects.values_mut() {
            object.init_gpu_resources(device, layout);
        }
    }

    /// Writes changed model matrices to the GPU
    pub fn update_all_transforms(&mut self, queue: &wgpu::Queue) {
        for object in self.objects.values_mut() {
            object.update_transform(queue);
        }
    }

    pub fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.objects.contains_key(&test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;
    use crate::gfx::scene::object::Mesh;

    fn cube(name: &str) -> GameObject {
        GameObject::new(name, Mesh::from(generate_cube()), "phong")
    }

    #[test]
    fn test_duplicate_names_are_suffixed() {
        let mut scene = Scene::new();
        scene.add_object(cube("cube"));
        scene.add_object(cube("cube"));
        let third = scene.add_object(cube("cube"));
        assert_eq!(third.name(), "cube (2)");

        assert_eq!(scene.object_names(), ["cube", "cube (1)", "cube (2)"]);
    }

    #[test]
    fn test_lookup_and_remove() {
        let mut scene = Scene::new();
        scene.add_object(cube("a")).set_visible(false);
        assert!(!scene.object("a").unwrap().is_visible());
        assert!(scene.object_mut("b").is_none());

        assert!(scene.remove_object("a").is_some());
        assert_eq!(scene.object_count(), 0);
    }
}
