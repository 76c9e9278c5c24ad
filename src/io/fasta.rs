use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// 输出 FASTA 每行的字符数
pub const LINE_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub seq: Vec<u8>,
}

/// 逐条读取 FASTA 记录。
///
/// 标题行只保留第一个空白之前的部分作为 id；多行序列拼接，行内空白丢弃。
/// 不做大小写转换：read 不一定是核苷酸。
pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    pending: Option<String>,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: String::new(), pending: None, done: false }
    }

    fn read_line(&mut self) -> Result<bool> {
        self.buf.clear();
        let n = self.reader.read_line(&mut self.buf)?;
        Ok(n > 0)
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done {
            return Ok(None);
        }

        let header = match self.pending.take() {
            Some(h) => h,
            None => loop {
                if !self.read_line()? {
                    self.done = true;
                    return Ok(None);
                }
                if let Some(h) = self.buf.strip_prefix('>') {
                    break h.trim().to_string();
                }
            },
        };
        let id = header.split_whitespace().next().unwrap_or("").to_string();

        let mut seq = Vec::new();
        loop {
            if !self.read_line()? {
                self.done = true;
                break;
            }
            if let Some(h) = self.buf.strip_prefix('>') {
                self.pending = Some(h.trim().to_string());
                break;
            }
            seq.extend(self.buf.bytes().filter(|b| !b.is_ascii_whitespace()));
        }

        Ok(Some(FastaRecord { id, seq }))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// 读出文件中全部序列，空序列跳过
pub fn read_sequences(path: &Path) -> Result<Vec<Vec<u8>>> {
    let fh = File::open(path).with_context(|| format!("cannot open FASTA '{}'", path.display()))?;
    let mut reads = Vec::new();
    for rec in FastaReader::new(BufReader::new(fh)) {
        let rec = rec.with_context(|| format!("cannot read FASTA '{}'", path.display()))?;
        if !rec.seq.is_empty() {
            reads.push(rec.seq);
        }
    }
    Ok(reads)
}

/// 以 `>{prefix}{序号}` 为标题写出序列，序号从 1 开始，每行 [`LINE_WIDTH`] 个字符
pub fn write_records<W: Write, S: AsRef<[u8]>>(out: &mut W, prefix: &str, seqs: &[S]) -> Result<()> {
    for (i, s) in seqs.iter().enumerate() {
        writeln!(out, ">{}{}", prefix, i + 1)?;
        for line in s.as_ref().chunks(LINE_WIDTH) {
            out.write_all(line)?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

pub fn write_file<S: AsRef<[u8]>>(path: &Path, prefix: &str, seqs: &[S]) -> Result<()> {
    let fh = File::create(path).with_context(|| format!("cannot create '{}'", path.display()))?;
    let mut w = BufWriter::new(fh);
    write_records(&mut w, prefix, seqs)?;
    w.flush()?;
    Ok(())
}
