pub(crate) mod tick;
