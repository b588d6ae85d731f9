//! 选项名规范化
//!
//! 配置里的键既可以写成 snake_case 也可以写成 camelCase，
//! 在与构造参数名、setter 名比较之前统一转换成 camelCase。

use serde_json::Value as JsonValue;

/// 将 snake_case 转换为 camelCase
///
/// 每一段下划线之后的第一个字符转为大写，结果的首字符转为小写。
/// 位于末尾的下划线段只保留一个下划线，对已经是 camelCase 的输入幂等。
///
/// ```
/// use cascade::util::snake_to_camel_case;
///
/// assert_eq!(snake_to_camel_case("foo_bar_baz"), "fooBarBaz");
/// assert_eq!(snake_to_camel_case("fooBarBaz"), "fooBarBaz");
/// assert_eq!(snake_to_camel_case("X__"), "x_");
/// ```
pub fn snake_to_camel_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut output = String::with_capacity(input.len());

    let mut i = 0;
    while i < chars.len() {
        // 首字符自成一段，原样（大写后）输出，即使它本身是下划线
        if i == 0 {
            output.push(chars[0].to_ascii_uppercase());
            i = 1;
            continue;
        }

        if chars[i] != '_' {
            output.push(chars[i]);
            i += 1;
            continue;
        }

        let mut end = i;
        while end < chars.len() && chars[end] == '_' {
            end += 1;
        }

        match chars.get(end) {
            Some(&next) if next != '\n' => {
                output.push(next.to_ascii_uppercase());
                i = end + 1;
            }
            _ => {
                // 下划线段后面没有可转换的字符：整段折叠为一个下划线
                output.push('_');
                i = end;
            }
        }
    }

    lower_first(&output)
}

/// 对任意 JSON 值做规范化，非字符串返回 None
pub fn normalize_value(input: &JsonValue) -> Option<String> {
    input.as_str().map(snake_to_camel_case)
}

fn lower_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snake_to_camel_case() {
        assert_eq!(snake_to_camel_case(""), "");
        assert_eq!(snake_to_camel_case("foo"), "foo");
        assert_eq!(snake_to_camel_case("foo_bar"), "fooBar");
        assert_eq!(snake_to_camel_case("foo_bar_baz"), "fooBarBaz");
        assert_eq!(snake_to_camel_case("Foo_bar"), "fooBar");
        assert_eq!(snake_to_camel_case("foo__bar"), "fooBar");
        assert_eq!(snake_to_camel_case("optional_X"), "optionalX");
    }

    #[test]
    fn test_snake_to_camel_case_weird_strings() {
        assert_eq!(snake_to_camel_case("_"), "_");
        assert_eq!(snake_to_camel_case("___"), "__");
        assert_eq!(snake_to_camel_case("_ _"), "_ _");
        assert_eq!(snake_to_camel_case("X__"), "x_");
        assert_eq!(snake_to_camel_case("__X"), "_X");
    }

    #[test]
    fn test_snake_to_camel_case_idempotent() {
        for input in ["fooBarBaz", "includeStacktraces", "foo_bar_baz", "a_b_c_d", "stream"] {
            let once = snake_to_camel_case(input);
            assert_eq!(snake_to_camel_case(&once), once, "input: {}", input);
        }
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value(&json!("file_permission")), Some("filePermission".to_string()));
        assert_eq!(normalize_value(&json!(null)), None);
        assert_eq!(normalize_value(&json!(1)), None);
        assert_eq!(normalize_value(&json!([])), None);
    }
}
