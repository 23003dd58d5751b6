pub(crate) mod colormap;
pub(crate) mod image_seq;
pub(crate) mod sink;
pub(crate) mod source;
pub(crate) mod template;
