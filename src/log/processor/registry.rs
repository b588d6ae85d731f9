use crate::cfg::{method_arg, register_class, TypeDescriptor};
use crate::log::processor::{
    ProcessIdProcessor, PsrLogMessageProcessor, TagProcessor, UidProcessor,
};
use serde_json::json;

/// 内置 Processor 的类型描述
pub fn processor_descriptors() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::processor::<PsrLogMessageProcessor>("PsrLogMessageProcessor")
            .default_constructor(),
        TypeDescriptor::processor::<TagProcessor>("TagProcessor")
            .param_default("tags", json!([]))
            .method("add_tags", |processor, args| {
                processor.add_tags(tags_arg(args)?);
                Ok(())
            })
            .method("set_tags", |processor, args| {
                processor.set_tags(tags_arg(args)?);
                Ok(())
            })
            .constructor(|args| Ok(TagProcessor::new(args.parse(0)?))),
        TypeDescriptor::processor::<UidProcessor>("UidProcessor")
            .param_default("length", 7)
            .constructor(|args| UidProcessor::new(args.parse(0)?)),
        TypeDescriptor::processor::<ProcessIdProcessor>("ProcessIdProcessor")
            .default_constructor(),
    ]
}

// 列表值被展开成多个实参，每个实参是一个标签
fn tags_arg(args: Vec<crate::cfg::OptionValue>) -> anyhow::Result<Vec<String>> {
    (0..args.len()).map(|index| method_arg(&args, index)).collect()
}

/// 注册所有 Processor 实现
pub fn register_processors() {
    for descriptor in processor_descriptors() {
        register_class(descriptor);
    }
}
