//! Text ingestion through a caller-supplied embedding model

use std::path::Path;

use anyhow::anyhow;
use quiver_core::IndexEngine;

use crate::error::{Result, StoreError};
use crate::store::VectorStore;

/// Turns text into vectors. Implemented by the caller around whatever model it uses.
pub trait EmbeddingSource {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// One vector per text, in order. Defaults to calling [`EmbeddingSource::embed`]
    /// per text.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

impl<F> EmbeddingSource for F
where
    F: Fn(&str) -> anyhow::Result<Vec<f32>>,
{
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self(text)
    }
}

fn embed_all<S: EmbeddingSource + ?Sized>(
    source: &S,
    texts: Vec<String>,
) -> Result<Vec<(String, Vec<f32>)>> {
    let vectors = source.embed_batch(&texts).map_err(StoreError::Embedding)?;
    if vectors.len() != texts.len() {
        return Err(StoreError::Embedding(anyhow!(
            "embedding source returned {} vectors for {} texts",
            vectors.len(),
            texts.len()
        )));
    }
    Ok(texts.into_iter().zip(vectors).collect())
}

impl<E: IndexEngine> VectorStore<String, E> {
    /// Embed `texts` and [`create`](VectorStore::create) them, each text being its own record.
    pub fn create_from_texts<S, I>(&mut self, source: &S, texts: I, persist: bool) -> Result<Vec<u64>>
    where
        S: EmbeddingSource + ?Sized,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let items = embed_all(source, texts.into_iter().map(Into::into).collect())?;
        self.create(items, persist)
    }

    /// Embed `texts` and [`update`](VectorStore::update) the snapshot at `path`.
    ///
    /// Embedding happens before the snapshot is touched, so a failing model
    /// leaves it unchanged.
    pub fn update_from_texts<S, I>(
        &mut self,
        source: &S,
        texts: I,
        path: impl AsRef<Path>,
    ) -> Result<Vec<u64>>
    where
        S: EmbeddingSource + ?Sized,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let items = embed_all(source, texts.into_iter().map(Into::into).collect())?;
        self.update(items, path)
    }
}
