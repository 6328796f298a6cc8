//! 重复文件检测：大小分桶 → 全文指纹 → 逐字节确认

use ai_storage_domain::{DuplicateGroup, FileRecord};
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 读取块大小，指纹与逐字节比对共用
const READ_CHUNK_BYTES: usize = 64 * 1024;

/// blake3 全文指纹（十六进制）
fn fingerprint_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; READ_CHUNK_BYTES];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// 读满缓冲区或到 EOF，屏蔽短读
fn read_full(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

fn contents_equal(a: &Path, b: &Path) -> std::io::Result<bool> {
    let mut file_a = File::open(a)?;
    let mut file_b = File::open(b)?;
    let mut buf_a = vec![0u8; READ_CHUNK_BYTES];
    let mut buf_b = vec![0u8; READ_CHUNK_BYTES];
    loop {
        let n_a = read_full(&mut file_a, &mut buf_a)?;
        let n_b = read_full(&mut file_b, &mut buf_b)?;
        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// 组内成员与首位逐字节比对；不一致或读取失败的成员剔除并告警
fn verify_members(members: Vec<FileRecord>) -> Vec<FileRecord> {
    let mut verified: Vec<FileRecord> = Vec::with_capacity(members.len());
    for member in members {
        if verified.is_empty() {
            verified.push(member);
            continue;
        }
        match contents_equal(&verified[0].path, &member.path) {
            Ok(true) => verified.push(member),
            Ok(false) => log::warn!(
                "fingerprint collision between {} and {}",
                verified[0].path.display(),
                member.path.display()
            ),
            Err(e) => log::warn!("verify failed for {}: {}", member.path.display(), e),
        }
    }
    verified
}

/// 在文件快照序列上查找重复组
///
/// 小于 min_size_bytes 的文件不参与。读不到的候选剔除并告警，
/// 从不让单个坏文件中断整次检测。输出与输入顺序无关。
pub fn find_duplicates<'a, I>(files: I, min_size_bytes: u64) -> Vec<DuplicateGroup>
where
    I: IntoIterator<Item = &'a FileRecord>,
{
    // 第一阶段：按大小分桶，大小唯一的文件不可能重复
    let mut by_size: HashMap<u64, Vec<&FileRecord>> = HashMap::new();
    for record in files {
        if record.size < min_size_bytes {
            continue;
        }
        by_size.entry(record.size).or_default().push(record);
    }
    let candidates: Vec<&FileRecord> = by_size
        .into_values()
        .filter(|bucket| bucket.len() > 1)
        .flatten()
        .collect();

    // 第二阶段：并行计算全文指纹
    let by_fingerprint: DashMap<(u64, String), Vec<FileRecord>> = DashMap::new();
    candidates.par_iter().for_each(|record| {
        match fingerprint_file(&record.path) {
            Ok(fp) => by_fingerprint
                .entry((record.size, fp))
                .or_default()
                .push((*record).clone()),
            Err(e) => log::warn!("fingerprint failed for {}: {}", record.path.display(), e),
        }
    });

    // 第三阶段：按 keeper 规则排序后逐字节确认
    let mut groups: Vec<DuplicateGroup> = by_fingerprint
        .into_iter()
        .filter_map(|((size, fingerprint), mut members)| {
            if members.len() < 2 {
                return None;
            }
            DuplicateGroup::sort_members(&mut members);
            let members = verify_members(members);
            if members.len() < 2 {
                return None;
            }
            Some(DuplicateGroup {
                size,
                fingerprint,
                members,
            })
        })
        .collect();

    groups.sort_by(|a, b| {
        b.wasted_bytes()
            .cmp(&a.wasted_bytes())
            .then_with(|| a.fingerprint.cmp(&b.fingerprint))
    });
    groups
}
