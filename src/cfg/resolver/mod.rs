//! 选项解析
//!
//! 构造参数和额外选项分开解析，各自维护一份进程级缓存。

pub mod constructor;
pub mod extra_options;

pub use constructor::ConstructorResolver;
pub use extra_options::{ExtraOptionLookup, ExtraOptionsResolver};

/// 丢弃某个 class 的全部缓存，class 被重新注册时调用
pub(crate) fn evict_class(class: &str) {
    constructor::evict(class);
    extra_options::evict(class);
}
