// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::ffi::c_void;
use std::io;
use std::num::NonZeroUsize;
use std::os::fd::OwnedFd;
use std::ptr::NonNull;

use nix::fcntl::OFlag;
use nix::sys::mman::{mmap, munmap, shm_open, shm_unlink, MapFlags, ProtFlags};
use nix::sys::stat::Mode;
use nix::unistd::ftruncate;

use lift_proto::{DoorStatus, Floor};

/// On-disk (well, in-`/dev/shm`) layout of one car record.
///
/// Field order and sizes are part of the inter-process contract: every
/// attaching process maps the same bytes. Floor and status fields are
/// NUL-padded ASCII labels; flags are 0 or 1, any larger value being a
/// data-consistency violation the safety monitor detects.
#[repr(C)]
struct CarRecord {
    mutex: libc::pthread_mutex_t,
    cond: libc::pthread_cond_t,
    current_floor: [u8; 4],
    destination_floor: [u8; 4],
    status: [u8; 8],
    open_button: u8,
    close_button: u8,
    door_obstruction: u8,
    overload: u8,
    emergency_stop: u8,
    individual_service_mode: u8,
    emergency_mode: u8,
}

/// Shared-memory object name for a car: `/car<name>`.
pub fn object_name(car_name: &str) -> String {
    format!("/car{car_name}")
}

/// A mapped car record.
///
/// All access goes through [`SharedCar::lock`]; the returned guard is
/// the only way to read or write the record's fields.
pub struct SharedCar {
    ptr: NonNull<CarRecord>,
    shm_name: String,
    _fd: OwnedFd,
}

// The record's embedded process-shared mutex serializes every access,
// across threads exactly as across processes.
unsafe impl Send for SharedCar {}
unsafe impl Sync for SharedCar {}

fn io_err(e: nix::errno::Errno) -> io::Error {
    io::Error::from_raw_os_error(e as i32)
}

fn check(rc: libc::c_int) -> io::Result<()> {
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::from_raw_os_error(rc))
    }
}

fn map(fd: &OwnedFd) -> io::Result<NonNull<CarRecord>> {
    let len = NonZeroUsize::new(std::mem::size_of::<CarRecord>())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "zero-sized record"))?;
    let ptr = unsafe {
        mmap(None, len, ProtFlags::PROT_READ | ProtFlags::PROT_WRITE, MapFlags::MAP_SHARED, fd, 0)
    }
    .map_err(io_err)?;
    Ok(ptr.cast())
}

impl SharedCar {
    /// Create (or reinitialize) the record for a car, sized and
    /// initialized per the record contract: both floors at `lowest`,
    /// status `Closed`, all flags zero, mutex and condvar
    /// `PTHREAD_PROCESS_SHARED`.
    pub fn create(car_name: &str, lowest: Floor) -> io::Result<SharedCar> {
        let shm_name = object_name(car_name);
        let fd = shm_open(
            shm_name.as_str(),
            OFlag::O_CREAT | OFlag::O_RDWR,
            Mode::from_bits_truncate(0o666),
        )
        .map_err(io_err)?;
        ftruncate(&fd, std::mem::size_of::<CarRecord>() as libc::off_t).map_err(io_err)?;
        let ptr = map(&fd)?;

        let shared = SharedCar { ptr, shm_name, _fd: fd };
        shared.init(lowest)?;
        Ok(shared)
    }

    /// Attach to an existing record. Fails with `NotFound` if no car
    /// process has created it.
    pub fn attach(car_name: &str) -> io::Result<SharedCar> {
        let shm_name = object_name(car_name);
        let fd = shm_open(shm_name.as_str(), OFlag::O_RDWR, Mode::from_bits_truncate(0o666))
            .map_err(io_err)?;
        let ptr = map(&fd)?;
        Ok(SharedCar { ptr, shm_name, _fd: fd })
    }

    /// Remove the object's name so no further process can attach.
    /// Existing mappings stay valid until unmapped. Owner-only.
    pub fn unlink(&self) -> io::Result<()> {
        shm_unlink(self.shm_name.as_str()).map_err(io_err)
    }

    /// Acquire the record's mutex.
    pub fn lock(&self) -> io::Result<RecordGuard<'_>> {
        check(unsafe { libc::pthread_mutex_lock(std::ptr::addr_of_mut!((*self.rec()).mutex)) })?;
        Ok(RecordGuard { shared: self })
    }

    fn rec(&self) -> *mut CarRecord {
        self.ptr.as_ptr()
    }

    fn init(&self, lowest: Floor) -> io::Result<()> {
        let rec = self.rec();
        unsafe {
            let mut mutex_attr: libc::pthread_mutexattr_t = std::mem::zeroed();
            check(libc::pthread_mutexattr_init(&mut mutex_attr))?;
            check(libc::pthread_mutexattr_setpshared(
                &mut mutex_attr,
                libc::PTHREAD_PROCESS_SHARED,
            ))?;
            check(libc::pthread_mutex_init(std::ptr::addr_of_mut!((*rec).mutex), &mutex_attr))?;
            let _ = libc::pthread_mutexattr_destroy(&mut mutex_attr);

            let mut cond_attr: libc::pthread_condattr_t = std::mem::zeroed();
            check(libc::pthread_condattr_init(&mut cond_attr))?;
            check(libc::pthread_condattr_setpshared(&mut cond_attr, libc::PTHREAD_PROCESS_SHARED))?;
            check(libc::pthread_cond_init(std::ptr::addr_of_mut!((*rec).cond), &cond_attr))?;
            let _ = libc::pthread_condattr_destroy(&mut cond_attr);
        }

        let mut guard = self.lock()?;
        guard.set_current_floor(lowest);
        guard.set_destination_floor(lowest);
        guard.set_status(DoorStatus::Closed);
        guard.set_open_button(0);
        guard.set_close_button(0);
        guard.set_door_obstruction(0);
        guard.set_overload(0);
        guard.set_emergency_stop(0);
        guard.set_individual_service_mode(0);
        guard.set_emergency_mode(0);
        Ok(())
    }
}

impl Drop for SharedCar {
    fn drop(&mut self) {
        let _ = unsafe { munmap(self.ptr.cast::<c_void>(), std::mem::size_of::<CarRecord>()) };
    }
}

fn parse_label(bytes: &[u8]) -> Option<Floor> {
    let end = bytes.iter().position(|&b| b == 0)?;
    std::str::from_utf8(&bytes[..end]).ok()?.parse().ok()
}

unsafe fn store<const N: usize>(slot: *mut [u8; N], text: &str) {
    debug_assert!(text.len() < N);
    let mut bytes = [0u8; N];
    bytes[..text.len()].copy_from_slice(text.as_bytes());
    slot.write(bytes);
}

/// Exclusive view of a locked record. Unlocks on drop.
pub struct RecordGuard<'a> {
    shared: &'a SharedCar,
}

macro_rules! flag_accessors {
    ($($field:ident / $setter:ident;)*) => {$(
        pub fn $field(&self) -> u8 {
            unsafe { std::ptr::addr_of!((*self.shared.rec()).$field).read() }
        }

        pub fn $setter(&mut self, value: u8) {
            unsafe { std::ptr::addr_of_mut!((*self.shared.rec()).$field).write(value) }
        }
    )*};
}

impl RecordGuard<'_> {
    /// Block until the record is signalled. The mutex is released while
    /// waiting and re-held when this returns.
    pub fn wait(&mut self) -> io::Result<()> {
        let rec = self.shared.rec();
        check(unsafe {
            libc::pthread_cond_wait(
                std::ptr::addr_of_mut!((*rec).cond),
                std::ptr::addr_of_mut!((*rec).mutex),
            )
        })
    }

    /// Wake every waiter. Called after any mutation, per the record's
    /// contract.
    pub fn notify_all(&self) {
        let _ = unsafe {
            libc::pthread_cond_broadcast(std::ptr::addr_of_mut!((*self.shared.rec()).cond))
        };
    }

    /// Current floor, or `None` if the field does not hold a valid label.
    pub fn current_floor(&self) -> Option<Floor> {
        let bytes = unsafe { std::ptr::addr_of!((*self.shared.rec()).current_floor).read() };
        parse_label(&bytes)
    }

    pub fn set_current_floor(&mut self, floor: Floor) {
        unsafe {
            store(std::ptr::addr_of_mut!((*self.shared.rec()).current_floor), &floor.to_string())
        }
    }

    /// Destination floor, or `None` if the field does not hold a valid
    /// label.
    pub fn destination_floor(&self) -> Option<Floor> {
        let bytes = unsafe { std::ptr::addr_of!((*self.shared.rec()).destination_floor).read() };
        parse_label(&bytes)
    }

    pub fn set_destination_floor(&mut self, floor: Floor) {
        unsafe {
            store(
                std::ptr::addr_of_mut!((*self.shared.rec()).destination_floor),
                &floor.to_string(),
            )
        }
    }

    /// Door status, or `None` if the field does not hold a valid status
    /// name.
    pub fn status(&self) -> Option<DoorStatus> {
        let bytes = unsafe { std::ptr::addr_of!((*self.shared.rec()).status).read() };
        let end = bytes.iter().position(|&b| b == 0)?;
        DoorStatus::parse(std::str::from_utf8(&bytes[..end]).ok()?)
    }

    pub fn set_status(&mut self, status: DoorStatus) {
        unsafe { store(std::ptr::addr_of_mut!((*self.shared.rec()).status), status.as_str()) }
    }

    flag_accessors! {
        open_button / set_open_button;
        close_button / set_close_button;
        door_obstruction / set_door_obstruction;
        overload / set_overload;
        emergency_stop / set_emergency_stop;
        individual_service_mode / set_individual_service_mode;
        emergency_mode / set_emergency_mode;
    }
}

impl Drop for RecordGuard<'_> {
    fn drop(&mut self) {
        let _ =
            unsafe { libc::pthread_mutex_unlock(std::ptr::addr_of_mut!((*self.shared.rec()).mutex)) };
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
