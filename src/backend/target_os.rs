/// Operating-system conventions the freestanding entry routine depends on.
pub trait TargetOS {
    fn name(&self) -> &'static str;
    fn syscall_exit(&self) -> u32;
    fn clone_box(&self) -> Box<dyn TargetOS>;
}

pub struct Linux;
impl TargetOS for Linux {
    fn name(&self) -> &'static str { "linux" }
    fn syscall_exit(&self) -> u32 { 60 }
    fn clone_box(&self) -> Box<dyn TargetOS> {
        Box::new(Linux)
    }
}

pub struct FreeBSD;
impl TargetOS for FreeBSD {
    fn name(&self) -> &'static str { "freebsd" }
    fn syscall_exit(&self) -> u32 { 1 }
    fn clone_box(&self) -> Box<dyn TargetOS> {
        Box::new(FreeBSD)
    }
}

impl Clone for Box<dyn TargetOS> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Look up a target by the name accepted on the command line.
pub fn target_os_from_name(name: &str) -> Option<Box<dyn TargetOS>> {
    match name {
        "linux" => Some(Box::new(Linux)),
        "freebsd" => Some(Box::new(FreeBSD)),
        _ => None,
    }
}
