use anyhow::{bail, Result};
use std::io::BufRead;

use crate::util::dna;

/// 参考序列中的一条记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    pub name: String,
    pub offset: usize,
    pub len: usize,
}

/// 多条 FASTA 记录首尾相接后的数值化参考
#[derive(Debug, Clone, Default)]
pub struct Reference {
    pub contigs: Vec<Contig>,
    pub text: Vec<u8>,
}

impl Reference {
    /// 文本位置所在的 contig 与 contig 内偏移
    pub fn locate(&self, pos: usize) -> Option<(&Contig, usize)> {
        let i = self.contigs.partition_point(|c| c.offset + c.len <= pos);
        self.contigs.get(i).filter(|c| pos >= c.offset).map(|c| (c, pos - c.offset))
    }
}

/// 读取整个 FASTA。记录之间不插入分隔符，跨越边界的读段按普通位置处理。
pub fn read_reference<R: BufRead>(reader: R) -> Result<Reference> {
    let mut reference = Reference::default();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end();
        if let Some(header) = line.strip_prefix('>') {
            let name = header.split_whitespace().next().unwrap_or("").to_string();
            reference.contigs.push(Contig { name, offset: reference.text.len(), len: 0 });
            continue;
        }
        if line.is_empty() {
            continue;
        }
        let Some(contig) = reference.contigs.last_mut() else {
            bail!("sequence data before the first FASTA header");
        };
        let before = reference.text.len();
        reference
            .text
            .extend(line.bytes().filter(|b| !b.is_ascii_whitespace()).map(dna::to_alphabet));
        contig.len += reference.text.len() - before;
    }
    if reference.contigs.is_empty() {
        bail!("no FASTA records found");
    }
    if reference.text.is_empty() {
        bail!("FASTA contains only empty sequences");
    }
    Ok(reference)
}
