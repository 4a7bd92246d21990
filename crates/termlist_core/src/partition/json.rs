use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use super::memory::InMemoryPartition;
use super::{FieldKind, PartitionData, PartitionReader, TERMS_FILE};
use crate::scanner::{TermDictionary, TermIter};

/// JSON-реализация партиции:
/// - terms.json : { version, doc_count, fields: { path -> { kind, terms } } }
#[derive(Debug, Default)]
pub struct JsonPartitionWriter {
    /// Сколько партиций нарезать round-robin (0 и 1: одна, прямо в out_dir).
    pub split: usize,
}

impl JsonPartitionWriter {
    pub fn with_split(split: usize) -> Self {
        Self { split }
    }

    /// Пишет партиции и возвращает их каталоги.
    pub fn write_partitions(&mut self, input_jsonl: &str, out_dir: &str) -> Result<Vec<PathBuf>> {
        let n = self.split.max(1);
        let mut parts: Vec<InMemoryPartition> = (0..n)
            .map(|i| InMemoryPartition::new(format!("part-{i:05}")))
            .collect();

        let f = File::open(input_jsonl).with_context(|| format!("open {input_jsonl}"))?;
        let br = BufReader::new(f);
        let mut next = 0usize;
        for (lineno, line) in br.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let v: serde_json::Value = serde_json::from_str(&line)
                .with_context(|| format!("{input_jsonl}:{}: bad json", lineno + 1))?;
            parts[next % n].add_json_doc(&v);
            next += 1;
        }

        let mut out = Vec::with_capacity(n);
        if n == 1 {
            let dir = PathBuf::from(out_dir);
            let p = parts.pop().unwrap_or_else(|| InMemoryPartition::new("part-00000"));
            write_terms(&dir, p.data())?;
            out.push(dir);
        } else {
            for p in &parts {
                let dir = Path::new(out_dir).join(p.id());
                write_terms(&dir, p.data())?;
                out.push(dir);
            }
        }
        tracing::info!(docs = next, partitions = out.len(), out = %out_dir, "partitions written");
        Ok(out)
    }
}

pub fn write_terms(dir: &Path, data: &PartitionData) -> Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(TERMS_FILE);
    let mut w = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut w, data)?;
    Ok(())
}

pub struct JsonPartitionReader {
    inner: InMemoryPartition,
}

impl JsonPartitionReader {
    /// id партиции = путь к каталогу.
    pub fn from_bytes(id: &str, bytes: &[u8]) -> Result<Self> {
        let data: PartitionData = serde_json::from_slice(bytes)
            .with_context(|| format!("partition {id}: bad {TERMS_FILE}"))?;
        anyhow::ensure!(
            data.version == super::PARTITION_FORMAT_VERSION,
            "partition {id}: unsupported version {}",
            data.version
        );
        Ok(Self {
            inner: InMemoryPartition::from_data(id, data),
        })
    }

    pub fn into_memory(self) -> InMemoryPartition {
        self.inner
    }
}

impl TermDictionary for JsonPartitionReader {
    fn partition_id(&self) -> &str {
        self.inner.partition_id()
    }

    fn terms(&self, field: &str) -> Result<Option<TermIter<'_>>> {
        self.inner.terms(field)
    }
}

impl PartitionReader for JsonPartitionReader {
    fn open_partition(path: &str) -> Result<Self> {
        let file = Path::new(path).join(TERMS_FILE);
        let bytes = fs::read(&file).with_context(|| format!("read {}", file.display()))?;
        Self::from_bytes(path, &bytes)
    }

    fn doc_count(&self) -> u64 {
        self.inner.doc_count()
    }

    fn field_kind(&self, field: &str) -> Option<FieldKind> {
        self.inner.field_kind(field)
    }
}
