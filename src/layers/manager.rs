use crate::{layers::circle::CircleLayer, prelude::HashMap, Error, Result};

/// Manages layers for the map, handling ordering and lookup
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, CircleLayer>,
    /// Ordered list of layer IDs for rendering (first is drawn first)
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer on top of the existing ones
    pub fn add_layer(&mut self, layer: CircleLayer) -> Result<()> {
        if self.layers.contains_key(&layer.id) {
            return Err(Error::LayerExists(layer.id));
        }
        self.render_order.push(layer.id.clone());
        self.layers.insert(layer.id.clone(), layer);
        Ok(())
    }

    /// Removes a layer from the manager
    pub fn remove_layer(&mut self, layer_id: &str) -> Result<CircleLayer> {
        let layer = self
            .layers
            .remove(layer_id)
            .ok_or_else(|| Error::LayerNotFound(layer_id.to_string()))?;
        self.render_order.retain(|id| id != layer_id);
        Ok(layer)
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&CircleLayer> {
        self.layers.get(layer_id)
    }

    /// First layer drawing from `source_id`, if any
    pub fn layer_using_source(&self, source_id: &str) -> Option<&CircleLayer> {
        self.layers().find(|layer| layer.source == source_id)
    }

    /// Gets all layers in render order
    pub fn layers(&self) -> impl Iterator<Item = &CircleLayer> + '_ {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id))
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.render_order.clear();
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the manager is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}
