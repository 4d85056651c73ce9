use rand::Rng;
use rand::distr::Alphanumeric;

/// 生成 4 位数字注册 PIN
pub fn generate_pin() -> String {
    let mut rng = rand::rng();
    format!("{:04}", rng.random_range(0..10000))
}

/// 生成指定长度的字母数字随机串
pub fn generate_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// 存储文件名，避免用户上传的文件名直接落盘
pub fn generate_storage_file_name(extension: Option<&str>) -> String {
    let base = uuid::Uuid::new_v4().simple().to_string();
    match extension {
        Some(ext) if !ext.is_empty() => format!("{base}.{}", ext.trim_start_matches('.')),
        _ => base,
    }
}
