#[cfg(test)]
mod scan {
    mod loopback;
    mod pipeline;
}
