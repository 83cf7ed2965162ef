//! Validation message catalog.
//!
//! Messages are end-user product copy and surface verbatim in API error
//! details, keyed by field. Numeric bounds interpolate with `{}` so whole
//! numbers render without a trailing `.0` (max 150 reads 数值不能大于150).

pub const REQUIRED: &str = "该字段为必填项";

pub const NOT_TEXT: &str = "必须是文本";
pub const PATTERN_MISMATCH: &str = "格式不正确";

pub fn text_min_length(n: usize) -> String {
    format!("长度不能少于{n}个字符")
}

pub fn text_max_length(n: usize) -> String {
    format!("长度不能超过{n}个字符")
}

pub const NOT_A_NUMBER: &str = "必须是数字";

pub fn number_min(min: f64) -> String {
    format!("数值不能小于{min}")
}

pub fn number_max(max: f64) -> String {
    format!("数值不能大于{max}")
}

pub fn number_step(step: f64) -> String {
    format!("数值必须是{step}的倍数")
}

pub const NOT_A_BOOLEAN: &str = "必须是布尔值";

pub const INVALID_DATE: &str = "日期格式无效";
pub const INVALID_EMAIL: &str = "邮箱格式不正确";
pub const INVALID_PHONE: &str = "手机号格式不正确";

pub const NOT_AN_ARRAY: &str = "必须是数组";
pub const OPTION_NOT_ALLOWED: &str = "选项不在允许范围内";
pub const EMPTY_OPTION: &str = "选项不能为空";
pub const EMPTY_TAG: &str = "标签不能为空";

pub fn min_items(n: usize) -> String {
    format!("至少选择{n}项")
}

pub fn max_items(n: usize) -> String {
    format!("最多选择{n}项")
}

pub const INVALID_RELATION_ID: &str = "关联ID格式无效";

pub const INVALID_EXPERIENCE_ENTRY: &str = "经历条目格式无效";
pub const EXPERIENCE_ENTRY_MISSING_FIELDS: &str = "经历条目缺少必填字段";

pub const INVALID_URL: &str = "链接格式无效";
pub const FILE_TOO_LARGE: &str = "文件大小超过限制";
pub const FILE_TYPE_NOT_ALLOWED: &str = "文件类型不支持";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_number_bounds_render_without_decimal_point() {
        assert_eq!(number_max(150.0), "数值不能大于150");
        assert_eq!(number_min(0.0), "数值不能小于0");
    }

    #[test]
    fn fractional_bounds_keep_their_fraction() {
        assert_eq!(number_step(0.5), "数值必须是0.5的倍数");
    }
}
