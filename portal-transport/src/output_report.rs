//! Per-OS output report delivery
//!
//! Windows portals reject interrupt-OUT writes issued through `WriteFile`, so
//! reports are pushed with `IOCTL_HID_SET_OUTPUT_REPORT` on a second handle to
//! the same device path. Every other platform writes through hidapi.

pub(crate) use imp::OutputChannel;

#[cfg(not(windows))]
mod imp {
    use hidapi::HidDevice;

    use crate::error::TransportError;
    use crate::protocol::Frame;

    /// hid_write backend; needs no state of its own
    pub(crate) struct OutputChannel;

    impl OutputChannel {
        pub(crate) fn open(_path: &str) -> Result<Self, TransportError> {
            Ok(Self)
        }

        /// Returns the number of bytes the device accepted
        pub(crate) fn send(&self, device: &HidDevice, frame: &Frame) -> Result<usize, TransportError> {
            device
                .write(frame)
                .map_err(|e| TransportError::WriteFailed(e.to_string()))
        }

        pub(crate) fn close(&mut self) {}
    }
}

#[cfg(windows)]
mod imp {
    use std::ffi::c_void;
    use std::ptr;

    use hidapi::HidDevice;
    use windows_sys::Win32::Foundation::{
        CloseHandle, GENERIC_READ, GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE,
    };
    use windows_sys::Win32::Storage::FileSystem::{
        CreateFileW, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
    };
    use windows_sys::Win32::System::IO::DeviceIoControl;

    use crate::error::TransportError;
    use crate::protocol::{Frame, OUTPUT_REPORT_SIZE};

    /// CTL_CODE(FILE_DEVICE_KEYBOARD, 101, METHOD_IN_DIRECT, FILE_ANY_ACCESS)
    const IOCTL_HID_SET_OUTPUT_REPORT: u32 = 0x000B_0195;

    /// Raw device handle used only for output reports
    pub(crate) struct OutputChannel {
        handle: HANDLE,
    }

    // The handle is owned exclusively and only touched through &mut/& self
    // from the owning transport.
    unsafe impl Send for OutputChannel {}

    impl OutputChannel {
        pub(crate) fn open(path: &str) -> Result<Self, TransportError> {
            let wide: Vec<u16> = path.encode_utf16().chain(std::iter::once(0)).collect();
            let handle = unsafe {
                CreateFileW(
                    wide.as_ptr(),
                    GENERIC_READ | GENERIC_WRITE,
                    FILE_SHARE_READ | FILE_SHARE_WRITE,
                    ptr::null(),
                    OPEN_EXISTING,
                    0,
                    ptr::null_mut(),
                )
            };
            if handle == INVALID_HANDLE_VALUE {
                return Err(TransportError::OpenFailed {
                    path: path.to_string(),
                    reason: std::io::Error::last_os_error().to_string(),
                });
            }
            Ok(Self { handle })
        }

        /// Returns the number of bytes the device accepted
        pub(crate) fn send(&self, _device: &HidDevice, frame: &Frame) -> Result<usize, TransportError> {
            if self.handle.is_null() {
                return Err(TransportError::Closed);
            }

            // METHOD_IN_DIRECT reads the report from the output buffer
            let mut report: Frame = *frame;
            let mut bytes_returned: u32 = 0;
            let ok = unsafe {
                DeviceIoControl(
                    self.handle,
                    IOCTL_HID_SET_OUTPUT_REPORT,
                    report.as_ptr() as *const c_void,
                    OUTPUT_REPORT_SIZE as u32,
                    report.as_mut_ptr() as *mut c_void,
                    OUTPUT_REPORT_SIZE as u32,
                    &mut bytes_returned,
                    ptr::null_mut(),
                )
            };
            if ok == 0 {
                return Err(TransportError::WriteFailed(
                    std::io::Error::last_os_error().to_string(),
                ));
            }
            Ok(OUTPUT_REPORT_SIZE)
        }

        pub(crate) fn close(&mut self) {
            if !self.handle.is_null() {
                unsafe {
                    CloseHandle(self.handle);
                }
                self.handle = ptr::null_mut();
            }
        }
    }

    impl Drop for OutputChannel {
        fn drop(&mut self) {
            self.close();
        }
    }
}
