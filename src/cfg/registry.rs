// class 注册表

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::descriptor::TypeDescriptor;
use super::resolver;
use crate::error::{CascadeError, Result};
use crate::log::formatter::formatter_descriptors;
use crate::log::handler::handler_descriptors;
use crate::log::processor::processor_descriptors;

/// 通用加载器的默认 class：没有参数也没有 setter 的空对象
pub const DEFAULT_OBJECT_CLASS: &str = "Object";

/// 空对象，未指定 class 且没有专用默认值时构造它
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmptyObject;

// 全局注册表，首次访问时装入内置类型
static REGISTRY: Lazy<RwLock<HashMap<String, Arc<TypeDescriptor>>>> = Lazy::new(|| {
    let mut classes = HashMap::new();
    let builtins = formatter_descriptors()
        .into_iter()
        .chain(handler_descriptors())
        .chain(processor_descriptors())
        .chain(std::iter::once(
            TypeDescriptor::object::<EmptyObject>(DEFAULT_OBJECT_CLASS).default_constructor(),
        ));
    for descriptor in builtins {
        classes.insert(descriptor.name().to_string(), Arc::new(descriptor));
    }
    RwLock::new(classes)
});

/// 注册 class，同名 class 会被替换
///
/// 替换时清掉该 class 已缓存的解析规则。
pub fn register_class(descriptor: TypeDescriptor) {
    let name = descriptor.name().to_string();
    log::debug!("register class [{}]", name);

    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name.clone(), Arc::new(descriptor));
    resolver::evict_class(&name);
}

/// class 是否已注册
pub fn class_exists(name: &str) -> bool {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(name)
}

/// 查找 class 的描述
pub fn descriptor(name: &str) -> Result<Arc<TypeDescriptor>> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
        .ok_or_else(|| CascadeError::ClassNotFound(name.to_string()))
}

/// 已注册的 class 名，按字母序
pub fn registered_classes() -> Vec<String> {
    let mut names: Vec<String> = REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .cloned()
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::descriptor::ObjectKind;

    #[test]
    fn test_builtin_classes() {
        for name in [
            "LineFormatter",
            "JsonFormatter",
            "StreamHandler",
            "RotatingFileHandler",
            "GroupHandler",
            "FilterHandler",
            "NullHandler",
            "TestHandler",
            "LogglyHandler",
            "PsrLogMessageProcessor",
            "TagProcessor",
            "UidProcessor",
            "ProcessIdProcessor",
            DEFAULT_OBJECT_CLASS,
        ] {
            assert!(class_exists(name), "missing builtin class {}", name);
        }

        assert_eq!(descriptor("StreamHandler").unwrap().kind(), ObjectKind::Handler);
        assert_eq!(descriptor("LineFormatter").unwrap().kind(), ObjectKind::Formatter);
        assert!(registered_classes().contains(&"UidProcessor".to_string()));
    }

    #[test]
    fn test_unknown_class() {
        assert!(!class_exists("NoSuchClass"));
        assert!(matches!(
            descriptor("NoSuchClass"),
            Err(CascadeError::ClassNotFound(name)) if name == "NoSuchClass"
        ));
    }

    #[test]
    fn test_register_class_replaces() {
        struct First;
        struct Second;

        register_class(TypeDescriptor::object::<First>("RegistryReplaceProbe").constructor(|_| Ok(First)));
        assert_eq!(descriptor("RegistryReplaceProbe").unwrap().params().len(), 0);

        register_class(
            TypeDescriptor::object::<Second>("RegistryReplaceProbe")
                .param("value")
                .constructor(|_| Ok(Second)),
        );
        assert_eq!(descriptor("RegistryReplaceProbe").unwrap().params().len(), 1);
    }
}
