//! 文本清洗：把码点 0–127 以外的字符替换成空格
//!
//! 纯函数，按字符计长度不变，幂等，任何输入都不会失败。

pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() { c } else { ' ' })
        .collect()
}
