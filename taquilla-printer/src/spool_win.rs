//! Windows print-spooler adapter
//!
//! Implements the [`Spooler`] capability over winspool via the Win32 API.
//! Queue handles are closed on drop.

use core::ffi::c_void;

use windows::Win32::Graphics::Printing::{
    ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, EnumJobsW, EnumPrintersW,
    GetPrinterW, JOB_INFO_1W, OpenPrinterW, PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL,
    PRINTER_HANDLE, PRINTER_INFO_2W, PRINTER_INFO_4W, StartDocPrinterW, StartPagePrinter,
    WritePrinter,
};
use windows::core::{PCWSTR, PWSTR};

use crate::error::{PrintError, PrintResult};
use crate::spool::{JobInfo, QueueDetails, SpoolHandle, Spooler};

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn pwstr_or_empty(p: PWSTR) -> String {
    if p.is_null() {
        String::new()
    } else {
        PWSTR(p.0).to_string().unwrap_or_default()
    }
}

/// Spooler backed by the Windows print subsystem.
pub struct WinSpooler;

impl Spooler for WinSpooler {
    fn enumerate(&self) -> PrintResult<Vec<String>> {
        unsafe {
            let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
            let mut needed: u32 = 0;
            let mut returned: u32 = 0;

            let _ = EnumPrintersW(flags, None, 4, None, &mut needed, &mut returned);

            if needed == 0 {
                return Ok(Vec::new());
            }

            let mut buf: Vec<u8> = vec![0; needed as usize];
            EnumPrintersW(
                flags,
                None,
                4,
                Some(buf.as_mut_slice()),
                &mut needed,
                &mut returned,
            )
            .map_err(|_| PrintError::Connection("EnumPrintersW failed".to_string()))?;

            let ptr = buf.as_ptr() as *const PRINTER_INFO_4W;
            let slice = std::slice::from_raw_parts(ptr, returned as usize);

            Ok(slice
                .iter()
                .filter(|info| !info.pPrinterName.is_null())
                .map(|info| pwstr_or_empty(info.pPrinterName))
                .collect())
        }
    }

    fn open(&self, name: &str) -> PrintResult<Box<dyn SpoolHandle>> {
        unsafe {
            let mut handle: PRINTER_HANDLE = PRINTER_HANDLE::default();
            let name_w = to_wide(name);

            OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None)
                .map_err(|e| PrintError::Connection(format!("OpenPrinterW({}): {}", name, e)))?;

            Ok(Box::new(WinSpoolHandle { handle }))
        }
    }
}

/// Open winspool queue handle.
struct WinSpoolHandle {
    handle: PRINTER_HANDLE,
}

impl SpoolHandle for WinSpoolHandle {
    fn details(&self) -> PrintResult<QueueDetails> {
        unsafe {
            let mut needed: u32 = 0;
            let _ = GetPrinterW(self.handle, 2, None, &mut needed);

            if needed == 0 {
                return Err(PrintError::Connection("GetPrinterW failed".to_string()));
            }

            let mut buf: Vec<u8> = vec![0; needed as usize];
            GetPrinterW(self.handle, 2, Some(buf.as_mut_slice()), &mut needed)
                .map_err(|_| PrintError::Connection("GetPrinterW failed".to_string()))?;

            let info = *(buf.as_ptr() as *const PRINTER_INFO_2W);

            Ok(QueueDetails {
                port_name: pwstr_or_empty(info.pPortName),
                driver_name: pwstr_or_empty(info.pDriverName),
                status: info.Status,
            })
        }
    }

    fn start_raw_job(&mut self, doc_name: &str) -> PrintResult<()> {
        unsafe {
            let doc_name_w = to_wide(doc_name);
            let datatype_w = to_wide("RAW");
            let doc_info = DOC_INFO_1W {
                pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
                pOutputFile: PWSTR::null(),
                pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
            };

            if StartDocPrinterW(self.handle, 1, &doc_info as *const DOC_INFO_1W) == 0 {
                return Err(PrintError::Transmission(
                    "StartDocPrinter failed".to_string(),
                ));
            }

            if !StartPagePrinter(self.handle).as_bool() {
                let _ = EndDocPrinter(self.handle);
                return Err(PrintError::Transmission(
                    "StartPagePrinter failed".to_string(),
                ));
            }

            Ok(())
        }
    }

    fn write(&mut self, data: &[u8]) -> PrintResult<()> {
        unsafe {
            let mut written: u32 = 0;
            let ok = WritePrinter(
                self.handle,
                data.as_ptr() as *const c_void,
                data.len() as u32,
                &mut written,
            );

            if !ok.as_bool() {
                return Err(PrintError::Transmission("WritePrinter failed".to_string()));
            }

            if written != data.len() as u32 {
                return Err(PrintError::Transmission("Incomplete write".to_string()));
            }

            Ok(())
        }
    }

    fn end_job(&mut self) -> PrintResult<()> {
        unsafe {
            if !EndPagePrinter(self.handle).as_bool() {
                return Err(PrintError::Transmission("EndPagePrinter failed".to_string()));
            }
            if !EndDocPrinter(self.handle).as_bool() {
                return Err(PrintError::Transmission("EndDocPrinter failed".to_string()));
            }
            Ok(())
        }
    }

    fn jobs(&self, max: u32) -> PrintResult<Vec<JobInfo>> {
        unsafe {
            let mut needed: u32 = 0;
            let mut returned: u32 = 0;

            let _ = EnumJobsW(self.handle, 0, max, 1, None, &mut needed, &mut returned);

            if needed == 0 {
                return Ok(Vec::new());
            }

            let mut buf: Vec<u8> = vec![0; needed as usize];
            EnumJobsW(
                self.handle,
                0,
                max,
                1,
                Some(buf.as_mut_slice()),
                &mut needed,
                &mut returned,
            )
            .map_err(|_| PrintError::Transmission("EnumJobsW failed".to_string()))?;

            let ptr = buf.as_ptr() as *const JOB_INFO_1W;
            let slice = std::slice::from_raw_parts(ptr, returned as usize);

            Ok(slice
                .iter()
                .map(|info| JobInfo {
                    id: info.JobId,
                    document: pwstr_or_empty(info.pDocument),
                    status: info.Status,
                })
                .collect())
        }
    }
}

impl Drop for WinSpoolHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = ClosePrinter(self.handle);
        }
    }
}
