//! Adapter lookup table.

use std::collections::HashMap;
use std::sync::Arc;

use vgen_models::ProviderFormat;

use crate::adapter::ProviderAdapter;
use crate::doubao::DoubaoAdapter;
use crate::error::{ProviderError, ProviderResult};
use crate::openai::OpenAiAdapter;
use crate::siliconflow::SiliconFlowAdapter;
use crate::vectorengine::VectorEngineAdapter;

/// Maps a format tag to its adapter.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<ProviderFormat, Arc<dyn ProviderAdapter>>,
}

impl AdapterRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in adapter.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(OpenAiAdapter));
        registry.register(Arc::new(SiliconFlowAdapter));
        registry.register(Arc::new(DoubaoAdapter));
        registry.register(Arc::new(VectorEngineAdapter));
        registry
    }

    /// Register an adapter, replacing any existing one for its format.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.format(), adapter);
    }

    pub fn get(&self, format: ProviderFormat) -> ProviderResult<Arc<dyn ProviderAdapter>> {
        self.adapters
            .get(&format)
            .cloned()
            .ok_or_else(|| ProviderError::UnsupportedFormat(format.to_string()))
    }

    pub fn formats(&self) -> Vec<ProviderFormat> {
        let mut formats: Vec<_> = self.adapters.keys().copied().collect();
        formats.sort_by_key(|f| f.as_str());
        formats
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_all_formats() {
        let registry = AdapterRegistry::with_defaults();
        for format in ProviderFormat::ALL {
            assert_eq!(registry.get(format).unwrap().format(), format);
        }
    }

    #[test]
    fn test_missing_adapter() {
        let registry = AdapterRegistry::new();
        let err = registry.get(ProviderFormat::Doubao).err().unwrap();
        assert!(matches!(err, ProviderError::UnsupportedFormat(ref f) if f == "doubao"));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(OpenAiAdapter));
        registry.register(Arc::new(OpenAiAdapter));
        assert_eq!(registry.formats(), vec![ProviderFormat::OpenAi]);
    }
}
