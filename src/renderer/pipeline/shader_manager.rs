//! Shader Template Manager
//!
//! Loads the WGSL program templates (embedded with `rust-embed`, read from
//! disk in debug builds so they can be edited without rebuilding) into one
//! shared minijinja [`Environment`], and caches compiled
//! `wgpu::ShaderModule`s by the xxh3-128 hash of their final source.
//!
//! Template syntax: `{$ ... $}` blocks, `{{ ... }}` expressions, `$$` line
//! statements.

use std::borrow::Cow;
use std::sync::OnceLock;

use minijinja::{Environment, Error, ErrorKind, syntax::SyntaxConfig};
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;

pub static SHADER_ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(RustEmbed)]
#[folder = "src/renderer/pipeline/shaders"]
struct ShaderAssets;

pub fn get_env() -> &'static Environment<'static> {
    SHADER_ENV.get_or_init(|| {
        let mut env = Environment::new();

        match SyntaxConfig::builder()
            .block_delimiters("{$", "$}")
            .variable_delimiters("{{", "}}")
            .line_statement_prefix("$$")
            .build()
        {
            Ok(syntax) => env.set_syntax(syntax),
            Err(e) => log::error!("shader template syntax rejected: {e}"),
        }

        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        env.set_loader(shader_loader);
        env.set_path_join_callback(|name, _parent| format!("chunks/{name}").into());
        env
    })
}

fn shader_loader(name: &str) -> Result<Option<String>, Error> {
    let filename = if std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wgsl"))
    {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}.wgsl"))
    };

    #[cfg(debug_assertions)]
    {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("src/renderer/pipeline/shaders")
            .join(filename.as_ref());
        if path.exists() {
            return match std::fs::read_to_string(&path) {
                Ok(source) => Ok(Some(source)),
                Err(e) => Err(Error::new(
                    ErrorKind::TemplateNotFound,
                    format!("Failed to read file: {e}"),
                )),
            };
        }
    }

    if let Some(file) = ShaderAssets::get(&filename)
        && let Ok(source) = std::str::from_utf8(file.data.as_ref())
    {
        return Ok(Some(source.to_string()));
    }

    Ok(None)
}

// ─── ShaderManager ────────────────────────────────────────────────────────────

/// Compiled module cache keyed by the xxh3-128 of the final WGSL.
#[derive(Default)]
pub struct ShaderManager {
    module_cache: FxHashMap<u128, wgpu::ShaderModule>,
}

impl ShaderManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, hash: u128) -> Option<&wgpu::ShaderModule> {
        self.module_cache.get(&hash)
    }

    pub fn insert(&mut self, hash: u128, module: wgpu::ShaderModule) {
        self.module_cache.insert(hash, module);
    }

    pub fn remove(&mut self, hash: u128) -> Option<wgpu::ShaderModule> {
        self.module_cache.remove(&hash)
    }

    #[must_use]
    pub fn module_count(&self) -> usize {
        self.module_cache.len()
    }
}
