mod attribute_decoder;
mod endpoint_selector;

pub use attribute_decoder::AttributeDecoder;
pub use endpoint_selector::EndpointSelector;
